//! # Bulletin Wire Types
//!
//! Message types shared by the bulletin registry shards and their clients:
//! the transaction envelope framing, the bulletin record itself, the
//! stochastic-payment voucher, and the auth proof/challenge carriers.
//!
//! ## Envelope layout
//!
//! ```text
//! Header16 || StochasticPayment || Bulletin || AuthProof || AuthChallenge
//! ```
//!
//! `Header16` is four big-endian u32 section lengths. A zero length means
//! the section is absent. Section payloads are bincode-encoded messages;
//! the header and the concatenation order are a fixed byte contract.
//!
//! ## Scope
//!
//! This crate validates field shapes only. Signature recovery, VRF
//! probability checks, and Merkle-path verification happen in the host
//! application before an envelope ever reaches a shard.

pub mod auth;
pub mod bulletin;
pub mod envelope;
pub mod errors;
pub mod payment;

pub use auth::{
    AndOfConditions, AuthChallenge, AuthProof, DynamicSetChallenge, DynamicSetProof,
    StaticSetChallenge, StaticSetProof, StochasticPayCondition,
};
pub use bulletin::{Address, Bulletin, BulletinType, TopicHash, ADDRESS_LEN, TOPIC_HASH_LEN};
pub use envelope::{BulletinId, TxEnvelope, BULLETIN_ID_LEN, ENVELOPE_HEADER_LEN};
pub use errors::ProtoError;
pub use payment::StochasticPayment;
