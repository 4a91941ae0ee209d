//! Ordered in-memory store.
//!
//! The reference implementation of the ordered-KV port: a `BTreeMap`
//! behind an `RwLock`, with per-entry expiry bookkeeping and cloned-map
//! snapshots. Suitable for tests and light hosts; production shards
//! adapt an embedded store with native TTL support instead.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::domain::errors::KvError;
use crate::ports::outbound::{
    KvEntry, OrderedKvStore, ReadView, SystemTimeSource, TimeSource, WriteBatch,
};

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Vec<u8>,
    /// Unix second after which the entry is dead; 0 means no expiry.
    expires_at: u64,
}

impl StoredEntry {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at == 0 || self.expires_at as i64 > now
    }
}

struct Inner {
    data: RwLock<BTreeMap<Vec<u8>, StoredEntry>>,
    clock: Arc<dyn TimeSource>,
}

/// In-memory ordered store with TTL-aware reads.
///
/// Expired entries are never returned, whether or not they have been
/// physically removed; a real embedded store's value-log GC plays that
/// removal role in production.
#[derive(Clone)]
pub struct MemKvStore {
    inner: Arc<Inner>,
}

impl MemKvStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemTimeSource))
    }

    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                data: RwLock::new(BTreeMap::new()),
                clock,
            }),
        }
    }

    /// Live-entry count, for tests and diagnostics.
    pub fn len(&self) -> usize {
        let now = self.inner.clock.now();
        self.inner
            .data
            .read()
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose expiry has passed, as a store GC daemon would.
    pub fn sweep_expired(&self) {
        let now = self.inner.clock.now();
        self.inner.data.write().retain(|_, e| e.is_live(now));
    }
}

impl Default for MemKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedKvStore for MemKvStore {
    fn begin(&self) -> Result<Box<dyn WriteBatch>, KvError> {
        Ok(Box::new(MemBatch {
            inner: self.inner.clone(),
            snapshot: self.inner.data.read().clone(),
            staged: BTreeMap::new(),
        }))
    }

    fn view(&self) -> Result<Box<dyn ReadView>, KvError> {
        Ok(Box::new(MemView {
            data: self.inner.data.read().clone(),
            now: self.inner.clock.now(),
        }))
    }
}

/// A frozen snapshot; expiry is judged against the snapshot instant so a
/// view stays self-consistent however long it lives.
struct MemView {
    data: BTreeMap<Vec<u8>, StoredEntry>,
    now: i64,
}

impl ReadView for MemView {
    fn get(&self, key: &[u8]) -> Result<Option<KvEntry>, KvError> {
        Ok(self
            .data
            .get(key)
            .filter(|e| e.is_live(self.now))
            .map(|e| KvEntry {
                value: e.value.clone(),
                expires_at: e.expires_at,
            }))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        let results = self
            .data
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(_, e)| e.is_live(self.now))
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect();
        Ok(results)
    }

    fn scan_range_rev<'a>(
        &'a self,
        start: &[u8],
        end: &[u8],
    ) -> Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), KvError>> + 'a> {
        if start > end {
            return Box::new(std::iter::empty());
        }
        let now = self.now;
        let iter = self
            .data
            .range::<[u8], _>((Bound::Included(start), Bound::Included(end)))
            .rev()
            .filter(move |(_, e)| e.is_live(now))
            .map(|(k, e)| Ok((k.clone(), e.value.clone())));
        Box::new(iter)
    }
}

/// Staged mutations over a begin-time snapshot. `None` marks a delete.
struct MemBatch {
    inner: Arc<Inner>,
    snapshot: BTreeMap<Vec<u8>, StoredEntry>,
    staged: BTreeMap<Vec<u8>, Option<StoredEntry>>,
}

impl WriteBatch for MemBatch {
    fn get(&self, key: &[u8]) -> Result<Option<KvEntry>, KvError> {
        let now = self.inner.clock.now();
        if let Some(staged) = self.staged.get(key) {
            return Ok(staged
                .as_ref()
                .filter(|e| e.is_live(now))
                .map(|e| KvEntry {
                    value: e.value.clone(),
                    expires_at: e.expires_at,
                }));
        }
        Ok(self
            .snapshot
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| KvEntry {
                value: e.value.clone(),
                expires_at: e.expires_at,
            }))
    }

    fn set(&mut self, key: &[u8], value: &[u8], ttl: Duration) -> Result<(), KvError> {
        let expires_at = self.inner.clock.now().max(0) as u64 + ttl.as_secs();
        self.staged.insert(
            key.to_vec(),
            Some(StoredEntry {
                value: value.to_vec(),
                expires_at,
            }),
        );
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KvError> {
        self.staged.insert(key.to_vec(), None);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), KvError> {
        let MemBatch { inner, staged, .. } = *self;
        let mut data = inner.data.write();
        for (key, staged) in staged {
            match staged {
                Some(entry) => {
                    data.insert(key, entry);
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ManualTimeSource;

    const NOW: i64 = 1_700_000_000;

    fn store() -> (MemKvStore, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::new(NOW));
        (MemKvStore::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_set_get_round_trip() {
        let (store, _clock) = store();
        let mut batch = store.begin().unwrap();
        batch.set(b"k1", b"v1", Duration::from_secs(60)).unwrap();
        batch.commit().unwrap();

        let view = store.view().unwrap();
        let entry = view.get(b"k1").unwrap().unwrap();
        assert_eq!(entry.value, b"v1");
        assert_eq!(entry.expires_at, (NOW + 60) as u64);
    }

    #[test]
    fn test_staged_writes_invisible_until_commit() {
        let (store, _clock) = store();
        let mut batch = store.begin().unwrap();
        batch.set(b"k1", b"v1", Duration::from_secs(60)).unwrap();

        let view = store.view().unwrap();
        assert!(view.get(b"k1").unwrap().is_none());

        batch.commit().unwrap();
        let view = store.view().unwrap();
        assert!(view.get(b"k1").unwrap().is_some());
    }

    #[test]
    fn test_batch_reads_own_writes() {
        let (store, _clock) = store();
        let mut batch = store.begin().unwrap();
        batch.set(b"k1", b"v1", Duration::from_secs(60)).unwrap();
        assert_eq!(batch.get(b"k1").unwrap().unwrap().value, b"v1");

        batch.delete(b"k1").unwrap();
        assert!(batch.get(b"k1").unwrap().is_none());
    }

    #[test]
    fn test_dropped_batch_discards_writes() {
        let (store, _clock) = store();
        {
            let mut batch = store.begin().unwrap();
            batch.set(b"k1", b"v1", Duration::from_secs(60)).unwrap();
        }
        let view = store.view().unwrap();
        assert!(view.get(b"k1").unwrap().is_none());
    }

    #[test]
    fn test_expired_entries_invisible() {
        let (store, clock) = store();
        let mut batch = store.begin().unwrap();
        batch.set(b"k1", b"v1", Duration::from_secs(60)).unwrap();
        batch.commit().unwrap();

        clock.advance(61);
        let view = store.view().unwrap();
        assert!(view.get(b"k1").unwrap().is_none());
        assert!(view.scan_prefix(b"k").unwrap().is_empty());

        store.sweep_expired();
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_isolation() {
        let (store, _clock) = store();
        let mut batch = store.begin().unwrap();
        batch.set(b"k1", b"v1", Duration::from_secs(60)).unwrap();
        batch.commit().unwrap();

        let view = store.view().unwrap();
        let mut batch = store.begin().unwrap();
        batch.set(b"k1", b"v2", Duration::from_secs(60)).unwrap();
        batch.commit().unwrap();

        // The earlier snapshot still sees the earlier value.
        assert_eq!(view.get(b"k1").unwrap().unwrap().value, b"v1");
        let fresh = store.view().unwrap();
        assert_eq!(fresh.get(b"k1").unwrap().unwrap().value, b"v2");
    }

    #[test]
    fn test_scan_prefix_is_ordered() {
        let (store, _clock) = store();
        let mut batch = store.begin().unwrap();
        for key in [&b"a2"[..], b"a1", b"b1", b"a3"] {
            batch.set(key, b"x", Duration::from_secs(60)).unwrap();
        }
        batch.commit().unwrap();

        let view = store.view().unwrap();
        let hits = view.scan_prefix(b"a").unwrap();
        let keys: Vec<_> = hits.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![&b"a1"[..], b"a2", b"a3"]);
    }

    #[test]
    fn test_scan_range_rev_descending_inclusive() {
        let (store, _clock) = store();
        let mut batch = store.begin().unwrap();
        for key in [&b"a"[..], b"b", b"c", b"d"] {
            batch.set(key, b"x", Duration::from_secs(60)).unwrap();
        }
        batch.commit().unwrap();

        let view = store.view().unwrap();
        let keys: Vec<_> = view
            .scan_range_rev(b"b", b"d")
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(keys, vec![b"d".to_vec(), b"c".to_vec(), b"b".to_vec()]);

        assert_eq!(view.scan_range_rev(b"x", b"a").count(), 0);
    }
}
