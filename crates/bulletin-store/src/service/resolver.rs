//! URL resolution: compact handle to stored envelope.
//!
//! Two-level protocol: the URL's block coordinates select a slot-range
//! bucket, the low TxIndex byte indexes into it positionally, and the
//! recovered head plus the URL's serial number form a 22-byte prefix
//! scanned over the main keyspace. The final fingerprint byte of the
//! main key is not known to the URL, hence the prefix scan.

use crate::domain::errors::StoreError;
use crate::domain::keys;
use crate::domain::url::GanyUrl;
use crate::ports::outbound::ReadView;

/// Resolve a gany URL against a read snapshot.
///
/// Returns the stored envelope bytes. A resolvable URL whose main record
/// was deleted (or expired ahead of its indexes) yields an empty vector,
/// not an error.
pub fn get_by_url(view: &dyn ReadView, url: &GanyUrl) -> Result<Vec<u8>, StoreError> {
    let sn = url.sn();
    let bucket = view
        .get(&keys::slot_range_key(&sn))?
        .ok_or(StoreError::KeyNotFound)?;

    let head = keys::head_at(&bucket.value, url.slot_index()).ok_or_else(|| {
        StoreError::MainKeyHeadNotFound {
            index: url.slot_index(),
            entries: bucket.value.len() / keys::MAIN_KEY_HEAD_LEN,
        }
    })?;

    let mut prefix = [0u8; keys::MAIN_KEY_HEAD_LEN + keys::SN_LEN];
    prefix[..keys::MAIN_KEY_HEAD_LEN].copy_from_slice(head);
    prefix[keys::MAIN_KEY_HEAD_LEN..].copy_from_slice(&sn);

    let mut envelope = Vec::new();
    for (_key, value) in view.scan_prefix(&prefix)? {
        if let Some((_, _, _, stored)) = keys::split_main_value(&value) {
            envelope.extend_from_slice(stored);
        }
    }
    Ok(envelope)
}
