//! Inbound port: the API a shard exposes to its consensus driver and to
//! readers.

use std::collections::HashSet;

use bulletin_proto::{Bulletin, BulletinType, TopicHash};

use crate::domain::errors::{DeliverResponse, StoreError};
use crate::domain::url::GanyUrl;

/// The per-shard registry API.
///
/// Writes are block-scoped: the driver opens a session with
/// `begin_block`, feeds deliveries serially, and makes them durable with
/// `commit`. A delivery failure aborts only that delivery; the session
/// stays open. Abandoning a session without committing rolls the whole
/// block back.
///
/// Reads run against committed snapshots and may execute concurrently
/// with the active session and with each other.
pub trait BulletinRegistryApi {
    /// Open a write session for one block.
    fn begin_block(&mut self, height: i64, block_time_sec: i64) -> Result<(), StoreError>;

    /// Stateless envelope validation; never touches state.
    fn check_tx(&self, tx: &[u8]) -> DeliverResponse;

    /// Validate and apply one delivery. The per-block transaction index
    /// advances only on success.
    fn deliver_tx(&mut self, tx: &[u8]) -> DeliverResponse;

    /// End-of-block hook; nothing to do at the engine level.
    fn end_block(&mut self, height: i64);

    /// Commit the open session. A failure here is fatal to the block.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Resolve a compact URL to the stored envelope bytes. Returns an
    /// empty envelope when the indexes still exist but the main record
    /// was deleted.
    fn get_by_url(&self, url: &GanyUrl) -> Result<Vec<u8>, StoreError>;

    /// All bulletins of `bulletin_type` on the topic whose author-declared
    /// timestamps fall within `[start_sec, end_sec]`, newest first,
    /// skipping serial numbers present in `exclude_sns` (lowercase hex,
    /// see [`crate::domain::keys::sn_hex`]).
    fn query_by_topic_and_time(
        &self,
        bulletin_type: BulletinType,
        topic_hash: &TopicHash,
        start_sec: i64,
        end_sec: i64,
        exclude_sns: &HashSet<String>,
    ) -> Result<Vec<Bulletin>, StoreError>;
}
