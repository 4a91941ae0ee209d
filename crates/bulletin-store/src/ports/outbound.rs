//! Outbound ports: what the engine requires from its host.
//!
//! The backing store must be an embedded ordered key-value store with
//! per-entry TTLs, staged write transactions, and snapshot reads. The
//! in-memory reference implementation lives in `adapters::memory`;
//! production hosts adapt their embedded store of choice.

use std::time::Duration;

use crate::domain::errors::KvError;

/// A value together with its expiration metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub value: Vec<u8>,
    /// Unix second after which the entry is invisible; 0 means no expiry.
    pub expires_at: u64,
}

/// A consistent read-only snapshot of the store.
///
/// Expired entries are invisible to every accessor, whether or not the
/// store's garbage collector has reclaimed them yet.
pub trait ReadView: Send {
    fn get(&self, key: &[u8]) -> Result<Option<KvEntry>, KvError>;

    /// All live entries whose key starts with `prefix`, in ascending key
    /// order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError>;

    /// Live entries with `start <= key <= end`, in descending key order.
    fn scan_range_rev<'a>(
        &'a self,
        start: &[u8],
        end: &[u8],
    ) -> Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), KvError>> + 'a>;
}

/// A staged write transaction.
///
/// Mutations are invisible to `ReadView`s until `commit`; dropping the
/// batch discards everything. `get` observes the batch's own staged
/// writes first (read-your-writes), then the snapshot the batch opened
/// with.
pub trait WriteBatch: Send {
    fn get(&self, key: &[u8]) -> Result<Option<KvEntry>, KvError>;

    fn set(&mut self, key: &[u8], value: &[u8], ttl: Duration) -> Result<(), KvError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), KvError>;

    fn commit(self: Box<Self>) -> Result<(), KvError>;
}

/// Handle to the embedded ordered store.
pub trait OrderedKvStore: Send + Sync {
    /// Open a write transaction. The engine runs at most one per shard;
    /// the store need not arbitrate concurrent writers.
    fn begin(&self) -> Result<Box<dyn WriteBatch>, KvError>;

    /// Open a read snapshot. May run concurrently with the write
    /// transaction and with other snapshots.
    fn view(&self) -> Result<Box<dyn ReadView>, KvError>;
}

/// Clock abstraction for TTL derivation (injectable in tests).
pub trait TimeSource: Send + Sync {
    /// Current unix second.
    fn now(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}
