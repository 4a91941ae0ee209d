//! The insert/overwrite/delete state machine.
//!
//! Every accepted creation writes three records on the block's write
//! batch: the main record and two secondary index records, all sharing a
//! TTL derived from the bulletin's declared expiry. Overwrites replace
//! the main value in place under the original creation's key, so the
//! compact URL handle stays stable across versions.

use std::time::Duration;

use bulletin_proto::{Bulletin, BulletinType, TxEnvelope};

use crate::domain::config::StoreConfig;
use crate::domain::errors::StoreError;
use crate::domain::keys;
use crate::domain::ttl::to_valid_ttl;
use crate::ports::outbound::WriteBatch;

/// The write-path state machine. Stateless between calls; all persistence
/// goes through the caller-supplied batch.
#[derive(Debug, Clone)]
pub struct BulletinStore {
    config: StoreConfig,
}

impl BulletinStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Apply one delivered envelope at `(block_time, tx_index)`.
    ///
    /// An empty `old_sn` routes to the creation path, anything else to
    /// the overwrite path. `now` is the clock reading used for every TTL
    /// derived by this call.
    pub fn put(
        &self,
        batch: &mut dyn WriteBatch,
        envelope: &TxEnvelope,
        block_time: i64,
        tx_index: i64,
        now: i64,
    ) -> Result<(), StoreError> {
        let bulletin = envelope.bulletin()?;
        if bulletin.is_modify() {
            self.overwrite(batch, envelope, &bulletin, now)
        } else {
            self.create(batch, envelope, &bulletin, block_time, tx_index, now)
        }
    }

    fn create(
        &self,
        batch: &mut dyn WriteBatch,
        envelope: &TxEnvelope,
        bulletin: &Bulletin,
        block_time: i64,
        tx_index: i64,
        now: i64,
    ) -> Result<(), StoreError> {
        // An empty content list on a creation writes nothing.
        if bulletin.content_list.is_empty() {
            return Ok(());
        }

        // Censor records may reference old material; everything below
        // them in the enum must be fresh relative to the block.
        if bulletin.bulletin_type < BulletinType::Censor
            && bulletin.timestamp < block_time - self.config.max_backdate_secs
        {
            return Err(StoreError::TimestampTooLong {
                timestamp: bulletin.timestamp,
                block_time,
            });
        }

        let sn = keys::sn_from_block_coords(block_time, tx_index);
        let topic_hash = bulletin.topic_hash();
        let head = keys::main_key_head(bulletin.bulletin_type, &topic_hash, bulletin.timestamp);
        let main_key = keys::main_key(&head, &sn, &bulletin.from);
        let id = envelope.bulletin_id()?;

        let mut value = Vec::with_capacity(
            keys::ID_LIST_OFFSET + keys::BULLETIN_ID_LEN + envelope.len(),
        );
        value.extend_from_slice(&topic_hash);
        value.extend_from_slice(&1u32.to_be_bytes());
        value.extend_from_slice(&id);
        value.extend_from_slice(envelope.as_bytes());

        let ttl = to_valid_ttl(bulletin.duration, now);
        batch.set(&main_key, &value, ttl)?;
        batch.set(&keys::index_by_sn_key(&sn), &head, ttl)?;
        self.append_to_slot_bucket(batch, &sn, &head, ttl, now)?;
        Ok(())
    }

    /// Append a main-key head to the `(BlockTime5, TxIndexHi2)` bucket,
    /// in delivery order. URL resolution indexes into the bucket by
    /// position, so the order must never change. A later append keeps
    /// whichever expiration reaches further.
    fn append_to_slot_bucket(
        &self,
        batch: &mut dyn WriteBatch,
        sn: &[u8; keys::SN_LEN],
        head: &[u8; keys::MAIN_KEY_HEAD_LEN],
        ttl: Duration,
        now: i64,
    ) -> Result<(), StoreError> {
        let bucket_key = keys::slot_range_key(sn);
        let existing = batch.get(&bucket_key)?;

        let entry = match existing {
            None => {
                batch.set(&bucket_key, head, ttl)?;
                return Ok(());
            }
            Some(entry) => entry,
        };

        let mut merged = Vec::with_capacity(entry.value.len() + head.len());
        merged.extend_from_slice(&entry.value);
        merged.extend_from_slice(head);

        let new_expire = now + ttl.as_secs() as i64;
        let keep = if (entry.expires_at as i64) > new_expire {
            Duration::from_secs(entry.expires_at - now as u64)
        } else {
            ttl
        };
        batch.set(&bucket_key, &merged, keep)?;
        Ok(())
    }

    fn overwrite(
        &self,
        batch: &mut dyn WriteBatch,
        envelope: &TxEnvelope,
        bulletin: &Bulletin,
        now: i64,
    ) -> Result<(), StoreError> {
        if bulletin.old_sn.len() != keys::SN_LEN {
            return Err(StoreError::InvalidOldSn {
                len: bulletin.old_sn.len(),
            });
        }
        let mut sn = [0u8; keys::SN_LEN];
        sn.copy_from_slice(&bulletin.old_sn);

        // The overwrite targets the ORIGINAL creation's key: same head
        // fields, the old SN, and the same author fingerprint.
        let topic_hash = bulletin.topic_hash();
        let head = keys::main_key_head(bulletin.bulletin_type, &topic_hash, bulletin.timestamp);
        let main_key = keys::main_key(&head, &sn, &bulletin.from);

        let entry = batch
            .get(&main_key)?
            .ok_or(StoreError::CantFindOldBulletin)?;
        let (_, count, id_list, stored_envelope) =
            keys::split_main_value(&entry.value).ok_or_else(|| StoreError::Store {
                message: format!("truncated main record for sn {}", keys::sn_hex(&sn)),
            })?;

        let stored = TxEnvelope::from_bytes(stored_envelope.to_vec());
        let old_bulletin = stored.bulletin()?;
        if !old_bulletin.can_be_overwritten_by(bulletin) {
            return Err(StoreError::CantOverwriteBulletin);
        }

        // Empty content on an overwrite means deletion. The two index
        // records are left to age out; readers tolerate the stale
        // entries by re-checking the stored topic hash.
        if bulletin.content_list.is_empty() {
            batch.delete(&main_key)?;
            return Ok(());
        }

        let new_id = envelope.bulletin_id()?;
        let mut value = Vec::with_capacity(
            keys::ID_LIST_OFFSET + id_list.len() + keys::BULLETIN_ID_LEN + envelope.len(),
        );
        value.extend_from_slice(&topic_hash);
        value.extend_from_slice(&(count + 1).to_be_bytes());
        value.extend_from_slice(id_list);
        value.extend_from_slice(&new_id);
        value.extend_from_slice(envelope.as_bytes());

        batch.set(&main_key, &value, to_valid_ttl(bulletin.duration, now))?;
        Ok(())
    }
}
