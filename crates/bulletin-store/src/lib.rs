//! # Bulletin Storage Engine
//!
//! The per-shard persistence engine of the bulletin registry. Clients
//! publish short authenticated bulletins on topics; each shard stores them
//! with a bounded lifetime, resolves compact URLs to the latest version of
//! a record, and answers time-window queries per topic and type.
//!
//! ## Architecture
//!
//! ```text
//! consensus driver (external)
//! ├── begin_block / deliver_tx / commit
//! │   └── BulletinRegistry (block session over one write batch)
//! │       └── BulletinStore (create / overwrite / delete state machine)
//! │
//! readers (external)
//! ├── get_by_url              - two-level index walk
//! └── query_by_topic_and_time - reverse time-window scan
//! ```
//!
//! ## Crate structure
//!
//! - `domain/` - key codec, URL handle, TTL policy, config, errors
//! - `ports/` - inbound API trait, ordered-KV and clock ports
//! - `service/` - the state machine, resolver, range query, block session
//! - `adapters/` - in-memory ordered store for tests and light hosts
//!
//! ## Key schema
//!
//! ```text
//! main:       Type1 || TopicHashXX8 || Timestamp5 || SN8 || FromHashXX8
//!          => TopicHash32 || HistoryCount4 || BulletinId64 x count || Envelope
//! by-SN:      220 || BlockTime5 || TxIndex3       => main key head (14 bytes)
//! slot-range: 220 || BlockTime5 || TxIndexHi2     => head14 x deliveries
//! ```
//!
//! The 8-byte topic and author fingerprints are truncated 64-bit hashes;
//! every read path that matched on a fingerprint re-checks the stored
//! 32-byte topic hash before accepting a hit.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod test_utils;

pub use domain::config::StoreConfig;
pub use domain::errors::{DeliverResponse, KvError, ResponseCode, StoreError};
pub use domain::keys;
pub use domain::ttl::{to_valid_ttl, MAX_TTL, MIN_TTL};
pub use domain::url::GanyUrl;

pub use ports::inbound::BulletinRegistryApi;
pub use ports::outbound::{
    KvEntry, OrderedKvStore, ReadView, SystemTimeSource, TimeSource, WriteBatch,
};

pub use service::session::BulletinRegistry;
pub use service::store::BulletinStore;

pub use adapters::memory::MemKvStore;
