//! The bulletin record: a short authenticated post tied to a topic.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::ProtoError;

/// Length of an author identity in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Length of a topic hash in bytes.
pub const TOPIC_HASH_LEN: usize = 32;

/// 20-byte author identity.
pub type Address = [u8; ADDRESS_LEN];

/// 32-byte SHA-256 digest of a topic.
pub type TopicHash = [u8; TOPIC_HASH_LEN];

/// Bulletin category.
///
/// The numeric order is load-bearing: the delivery state machine exempts
/// types at or above `Censor` from the timestamp-freshness gate, because
/// censor records legitimately reference old material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BulletinType {
    Blog = 0,
    Comment = 1,
    Column = 2,
    Censor = 3,
}

impl BulletinType {
    /// The key-schema byte for this type.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a key-schema byte back into a type.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(BulletinType::Blog),
            1 => Some(BulletinType::Comment),
            2 => Some(BulletinType::Column),
            3 => Some(BulletinType::Censor),
            _ => None,
        }
    }
}

/// A single bulletin.
///
/// `old_sn` is empty for a fresh creation; set to the 8-byte serial number
/// of the original creation, it turns the delivery into an overwrite (or,
/// with an empty `content_list`, a deletion) of that record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bulletin {
    pub bulletin_type: BulletinType,
    /// Topic byte string, arbitrary length, never empty.
    pub topic: Vec<u8>,
    /// Author-declared instant, unix seconds.
    pub timestamp: i64,
    /// Absolute expiry wall-clock second; drives the stored records' TTL.
    pub duration: i64,
    /// Back-pointer to the previous version's serial number; empty on creation.
    pub old_sn: Vec<u8>,
    pub from: Address,
    pub content_type: String,
    pub content_list: Vec<Vec<u8>>,
    pub censored_start: u32,
    pub censored_end: u32,
}

impl Bulletin {
    /// Field-shape validity. Type range and `from` length are enforced by
    /// construction; only the dynamic fields need checking.
    pub fn is_valid(&self) -> bool {
        !self.topic.is_empty() && self.timestamp > 0
    }

    pub fn validate(&self) -> Result<(), ProtoError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ProtoError::InvalidBulletinFields)
        }
    }

    /// Whether this bulletin targets an existing record.
    pub fn is_modify(&self) -> bool {
        !self.old_sn.is_empty()
    }

    /// The canonical 32-byte topic identifier.
    pub fn topic_hash(&self) -> TopicHash {
        Sha256::digest(&self.topic).into()
    }

    /// Overwrite compatibility: a stored bulletin may only be replaced by
    /// one that agrees on every identity-bearing field.
    pub fn can_be_overwritten_by(&self, other: &Bulletin) -> bool {
        self.topic == other.topic
            && self.bulletin_type == other.bulletin_type
            && self.timestamp == other.timestamp
            && self.from == other.from
            && self.duration == other.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bulletin {
        Bulletin {
            bulletin_type: BulletinType::Blog,
            topic: vec![0x12],
            timestamp: 1_700_000_000,
            duration: 1_700_003_600,
            old_sn: Vec::new(),
            from: [0xAB; 20],
            content_type: "text/plain".to_string(),
            content_list: vec![vec![1, 2]],
            censored_start: 0,
            censored_end: 0,
        }
    }

    #[test]
    fn test_valid_bulletin() {
        assert!(sample().is_valid());
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_topic_invalid() {
        let mut b = sample();
        b.topic.clear();
        assert_eq!(b.validate(), Err(ProtoError::InvalidBulletinFields));
    }

    #[test]
    fn test_zero_timestamp_invalid() {
        let mut b = sample();
        b.timestamp = 0;
        assert!(!b.is_valid());
    }

    #[test]
    fn test_topic_hash_known_vector() {
        let mut b = sample();
        b.topic = b"abc".to_vec();
        let expected: [u8; 32] = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(b.topic_hash(), expected);
    }

    #[test]
    fn test_type_ordering_matches_discriminants() {
        assert!(BulletinType::Blog < BulletinType::Censor);
        assert!(BulletinType::Column < BulletinType::Censor);
        assert_eq!(BulletinType::Censor.as_byte(), 3);
        assert_eq!(BulletinType::from_byte(2), Some(BulletinType::Column));
        assert_eq!(BulletinType::from_byte(4), None);
    }

    #[test]
    fn test_overwrite_compatibility() {
        let a = sample();
        let mut b = sample();
        b.content_list = vec![vec![3, 4]];
        assert!(a.can_be_overwritten_by(&b));

        b.from = [0xCD; 20];
        assert!(!a.can_be_overwritten_by(&b));

        let mut c = sample();
        c.duration += 1;
        assert!(!a.can_be_overwritten_by(&c));
    }
}
