//! The compact external handle for a bulletin.

use std::fmt;
use std::str::FromStr;

use bulletin_proto::TopicHash;

use crate::domain::errors::StoreError;
use crate::domain::keys::{low3, low5, SN_LEN};

/// Binary length of a gany URL: `TopicHash4 || BlockTime5 || TxIndex3`.
pub const GANY_URL_LEN: usize = 12;

/// URL scheme prefix of the string form.
pub const GANY_URL_SCHEME: &str = "gany://";

/// A 12-byte bulletin handle: the first four bytes of the topic hash
/// followed by the creation's serial number. The handle is stable across
/// overwrites because the chain is materialized by replacement under the
/// original serial number.
///
/// String form: `gany://<topic-hash-4 hex>.<block-time decimal>.<tx-index decimal>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GanyUrl([u8; GANY_URL_LEN]);

impl GanyUrl {
    pub fn new(topic_hash: &TopicHash, sn: [u8; SN_LEN]) -> Self {
        let mut url = [0u8; GANY_URL_LEN];
        url[..4].copy_from_slice(&topic_hash[..4]);
        url[4..].copy_from_slice(&sn);
        Self(url)
    }

    /// Build a URL from block coordinates instead of a pre-minted SN.
    pub fn from_block_coords(topic_hash: &TopicHash, block_time: i64, tx_index: i64) -> Self {
        let mut sn = [0u8; SN_LEN];
        sn[..5].copy_from_slice(&low5(block_time));
        sn[5..].copy_from_slice(&low3(tx_index));
        Self::new(topic_hash, sn)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != GANY_URL_LEN {
            return Err(StoreError::InvalidUrl {
                message: format!("expected {} bytes, got {}", GANY_URL_LEN, bytes.len()),
            });
        }
        let mut url = [0u8; GANY_URL_LEN];
        url.copy_from_slice(bytes);
        Ok(Self(url))
    }

    pub fn as_bytes(&self) -> &[u8; GANY_URL_LEN] {
        &self.0
    }

    /// First four bytes of the topic hash.
    pub fn topic_prefix(&self) -> &[u8] {
        &self.0[..4]
    }

    /// The embedded serial number.
    pub fn sn(&self) -> [u8; SN_LEN] {
        let mut sn = [0u8; SN_LEN];
        sn.copy_from_slice(&self.0[4..]);
        sn
    }

    /// Positional index into the slot-range bucket: the low TxIndex byte.
    pub fn slot_index(&self) -> usize {
        self.0[GANY_URL_LEN - 1] as usize
    }

    /// Block time encoded in the handle.
    pub fn block_time(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf[3..].copy_from_slice(&self.0[4..9]);
        u64::from_be_bytes(buf)
    }

    /// Transaction ordinal encoded in the handle.
    pub fn tx_index(&self) -> u32 {
        let mut buf = [0u8; 4];
        buf[1..].copy_from_slice(&self.0[9..]);
        u32::from_be_bytes(buf)
    }
}

impl fmt::Display for GanyUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}.{}",
            GANY_URL_SCHEME,
            hex::encode(self.topic_prefix()),
            self.block_time(),
            self.tx_index()
        )
    }
}

impl FromStr for GanyUrl {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix(GANY_URL_SCHEME).ok_or_else(|| {
            StoreError::InvalidUrl {
                message: format!("missing {} prefix", GANY_URL_SCHEME),
            }
        })?;

        let mut parts = rest.splitn(3, '.');
        let (topic, time, index) = match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(b), Some(i)) => (t, b, i),
            _ => {
                return Err(StoreError::InvalidUrl {
                    message: "expected topic.blocktime.txindex".to_string(),
                })
            }
        };

        let topic_bytes = hex::decode(topic).map_err(|e| StoreError::InvalidUrl {
            message: format!("topic hash prefix: {}", e),
        })?;
        if topic_bytes.len() != 4 {
            return Err(StoreError::InvalidUrl {
                message: format!("topic hash prefix must be 4 bytes, got {}", topic_bytes.len()),
            });
        }

        let block_time: u64 = time.parse().map_err(|_| StoreError::InvalidUrl {
            message: format!("block time '{}' is not a decimal", time),
        })?;
        if block_time >= 1u64 << 40 {
            return Err(StoreError::InvalidUrl {
                message: "block time exceeds five bytes".to_string(),
            });
        }

        let tx_index: u32 = index.parse().map_err(|_| StoreError::InvalidUrl {
            message: format!("tx index '{}' is not a decimal", index),
        })?;
        if tx_index >= 1 << 24 {
            return Err(StoreError::InvalidUrl {
                message: "tx index exceeds three bytes".to_string(),
            });
        }

        let mut url = [0u8; GANY_URL_LEN];
        url[..4].copy_from_slice(&topic_bytes);
        url[4..9].copy_from_slice(&low5(block_time as i64));
        url[9..].copy_from_slice(&low3(tx_index as i64));
        Ok(Self(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let topic_hash = [0x12u8; 32];
        let url = GanyUrl::from_block_coords(&topic_hash, 1_700_000_010, 0x0102_03);
        assert_eq!(url.topic_prefix(), &[0x12; 4]);
        assert_eq!(url.block_time(), 1_700_000_010);
        assert_eq!(url.tx_index(), 0x0102_03);
        assert_eq!(url.slot_index(), 0x03);
    }

    #[test]
    fn test_string_round_trip() {
        let topic_hash = [0xABu8; 32];
        let url = GanyUrl::from_block_coords(&topic_hash, 1_700_000_010, 42);
        let text = url.to_string();
        assert_eq!(text, "gany://abababab.1700000010.42");
        assert_eq!(text.parse::<GanyUrl>().unwrap(), url);
    }

    #[test]
    fn test_parse_rejects_bad_scheme() {
        assert!("http://abababab.1.2".parse::<GanyUrl>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!("gany://abababab.1700000010".parse::<GanyUrl>().is_err());
        assert!("gany://zzzz.1.2".parse::<GanyUrl>().is_err());
        assert!("gany://ababab.1.2".parse::<GanyUrl>().is_err());
        assert!("gany://abababab.x.2".parse::<GanyUrl>().is_err());
        assert!("gany://abababab.1099511627776.2".parse::<GanyUrl>().is_err());
        assert!("gany://abababab.1.16777216".parse::<GanyUrl>().is_err());
    }

    #[test]
    fn test_from_bytes_length_check() {
        assert!(GanyUrl::from_bytes(&[0u8; 11]).is_err());
        assert!(GanyUrl::from_bytes(&[0u8; 12]).is_ok());
    }
}
