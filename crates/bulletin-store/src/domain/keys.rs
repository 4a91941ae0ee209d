//! Composite-key codec for the bulletin keyspace.
//!
//! All multi-byte integers are big-endian. "Low-N" means the low N bytes
//! of the 8-byte big-endian encoding.

use bulletin_proto::{Address, BulletinType, TopicHash};
use xxhash_rust::xxh64::xxh64;

/// Full main key: `Type1 || TopicHashXX8 || Timestamp5 || SN8 || FromHashXX8`.
pub const MAIN_KEY_LEN: usize = 30;

/// Main key head: `Type1 || TopicHashXX8 || Timestamp5`.
pub const MAIN_KEY_HEAD_LEN: usize = 14;

/// Serial number: `BlockTime5 || TxIndex3`.
pub const SN_LEN: usize = 8;

/// First byte of every index key, above the bulletin-type range.
pub const INDEX_TAG: u8 = 220;

/// Offset of the history count inside a main value.
pub const HISTORY_COUNT_OFFSET: usize = 32;

/// Offset of the ID list inside a main value.
pub const ID_LIST_OFFSET: usize = 36;

/// Length of one entry in a main value's ID list.
pub const BULLETIN_ID_LEN: usize = bulletin_proto::BULLETIN_ID_LEN;

/// 8-byte fingerprint of arbitrary bytes: the big-endian encoding of an
/// unkeyed 64-bit xxhash. Fingerprints are not collision-free; readers
/// must re-check full identities on the stored value.
pub fn short_hash(data: &[u8]) -> [u8; 8] {
    xxh64(data, 0).to_be_bytes()
}

/// Low 5 bytes of a second-precision instant.
pub fn low5(v: i64) -> [u8; 5] {
    let b = (v as u64).to_be_bytes();
    [b[3], b[4], b[5], b[6], b[7]]
}

/// Low 3 bytes of a transaction ordinal.
pub fn low3(v: i64) -> [u8; 3] {
    let b = (v as u64).to_be_bytes();
    [b[5], b[6], b[7]]
}

/// Mint the serial number for a delivery: `Low5(block_time) || Low3(tx_index)`.
pub fn sn_from_block_coords(block_time: i64, tx_index: i64) -> [u8; SN_LEN] {
    let mut sn = [0u8; SN_LEN];
    sn[..5].copy_from_slice(&low5(block_time));
    sn[5..].copy_from_slice(&low3(tx_index));
    sn
}

/// The per-(type, topic, timestamp) head shared by a main key and its
/// index entries.
pub fn main_key_head(
    bulletin_type: BulletinType,
    topic_hash: &TopicHash,
    timestamp: i64,
) -> [u8; MAIN_KEY_HEAD_LEN] {
    let mut head = [0u8; MAIN_KEY_HEAD_LEN];
    head[0] = bulletin_type.as_byte();
    head[1..9].copy_from_slice(&short_hash(topic_hash));
    head[9..].copy_from_slice(&low5(timestamp));
    head
}

/// Full main key from its three parts.
pub fn main_key(
    head: &[u8; MAIN_KEY_HEAD_LEN],
    sn: &[u8; SN_LEN],
    from: &Address,
) -> [u8; MAIN_KEY_LEN] {
    let mut key = [0u8; MAIN_KEY_LEN];
    key[..MAIN_KEY_HEAD_LEN].copy_from_slice(head);
    key[MAIN_KEY_HEAD_LEN..MAIN_KEY_HEAD_LEN + SN_LEN].copy_from_slice(sn);
    key[MAIN_KEY_HEAD_LEN + SN_LEN..].copy_from_slice(&short_hash(from));
    key
}

/// Exact-SN index key: `220 || BlockTime5 || TxIndex3` (9 bytes).
pub fn index_by_sn_key(sn: &[u8; SN_LEN]) -> [u8; 1 + SN_LEN] {
    let mut key = [0u8; 1 + SN_LEN];
    key[0] = INDEX_TAG;
    key[1..].copy_from_slice(sn);
    key
}

/// Slot-range bucket key: `220 || BlockTime5 || TxIndexHi2` (8 bytes).
/// All deliveries sharing the top two TxIndex bytes land in one bucket.
pub fn slot_range_key(sn: &[u8; SN_LEN]) -> [u8; SN_LEN] {
    let mut key = [0u8; SN_LEN];
    key[0] = INDEX_TAG;
    key[1..].copy_from_slice(&sn[..SN_LEN - 1]);
    key
}

/// Positional lookup into a slot-range bucket value. `None` when the
/// bucket holds fewer than `index + 1` heads.
pub fn head_at(bucket: &[u8], index: usize) -> Option<&[u8]> {
    let start = index * MAIN_KEY_HEAD_LEN;
    let end = start + MAIN_KEY_HEAD_LEN;
    if bucket.len() < end {
        return None;
    }
    Some(&bucket[start..end])
}

/// Canonical exclusion-set form of a serial number: lowercase hex.
pub fn sn_hex(sn: &[u8]) -> String {
    hex::encode(sn)
}

/// Split a stored main value into
/// `(topic_hash32, history_count, id_list, envelope)`.
/// `None` when the value is shorter than its own header claims.
pub fn split_main_value(value: &[u8]) -> Option<(&[u8], u32, &[u8], &[u8])> {
    if value.len() < ID_LIST_OFFSET {
        return None;
    }
    let mut count_buf = [0u8; 4];
    count_buf.copy_from_slice(&value[HISTORY_COUNT_OFFSET..ID_LIST_OFFSET]);
    let count = u32::from_be_bytes(count_buf);
    let envelope_start = ID_LIST_OFFSET + count as usize * BULLETIN_ID_LEN;
    if value.len() < envelope_start {
        return None;
    }
    Some((
        &value[..HISTORY_COUNT_OFFSET],
        count,
        &value[ID_LIST_OFFSET..envelope_start],
        &value[envelope_start..],
    ))
}
