//! Time-window range query over one topic and type.
//!
//! Main keys sort by `(type, topic fingerprint, timestamp, SN, author
//! fingerprint)`, so a reverse scan between two padded bounds yields the
//! topic's records newest-first by author-declared timestamp, serial
//! number breaking ties. The topic fingerprint is only eight bytes;
//! every hit is re-checked against the full stored topic hash before it
//! is returned.

use std::collections::HashSet;

use bulletin_proto::{Bulletin, BulletinType, TopicHash, TxEnvelope};

use crate::domain::config::StoreConfig;
use crate::domain::errors::StoreError;
use crate::domain::keys;
use crate::ports::outbound::ReadView;

/// All bulletins of `bulletin_type` on the topic with declared timestamps
/// in `[start_sec, end_sec]`, newest first, minus the serial numbers in
/// `exclude_sns` (lowercase hex per [`keys::sn_hex`]).
///
/// Returns the bulletins and the visited-record count. Iteration stops at
/// the window's lower bound or at the configured caps, whichever comes
/// first.
pub fn query_by_topic_and_time(
    view: &dyn ReadView,
    config: &StoreConfig,
    bulletin_type: BulletinType,
    topic_hash: &TopicHash,
    start_sec: i64,
    end_sec: i64,
    exclude_sns: &HashSet<String>,
) -> Result<(Vec<Bulletin>, usize), StoreError> {
    let fingerprint = keys::short_hash(topic_hash);

    let mut key_start = [0x00u8; keys::MAIN_KEY_LEN];
    key_start[0] = bulletin_type.as_byte();
    key_start[1..9].copy_from_slice(&fingerprint);
    key_start[9..keys::MAIN_KEY_HEAD_LEN].copy_from_slice(&keys::low5(start_sec));

    let mut key_end = [0xFFu8; keys::MAIN_KEY_LEN];
    key_end[..9].copy_from_slice(&key_start[..9]);
    key_end[9..keys::MAIN_KEY_HEAD_LEN].copy_from_slice(&keys::low5(end_sec));

    let mut results = Vec::new();
    let mut count = 0usize;

    for item in view.scan_range_rev(&key_start, &key_end) {
        let (key, value) = item?;
        if key.len() < keys::MAIN_KEY_HEAD_LEN + keys::SN_LEN {
            continue;
        }

        let sn = &key[keys::MAIN_KEY_HEAD_LEN..keys::MAIN_KEY_HEAD_LEN + keys::SN_LEN];
        if exclude_sns.contains(&keys::sn_hex(sn)) {
            continue;
        }

        let (stored_topic, _, _, envelope_bytes) = match keys::split_main_value(&value) {
            Some(parts) => parts,
            None => continue,
        };
        // Fingerprint collisions put foreign topics inside our bounds;
        // the full hash in the value is authoritative.
        if stored_topic != topic_hash {
            continue;
        }

        let envelope = TxEnvelope::from_bytes(envelope_bytes.to_vec());
        results.push(envelope.bulletin()?);
        count += 1;

        if results.len() > config.max_results {
            break;
        }
        if count > config.max_result_count {
            break;
        }
    }

    Ok((results, count))
}
