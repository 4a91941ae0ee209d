//! Error types for envelope framing and field validation.

use thiserror::Error;

/// Errors produced while slicing, decoding, or validating an envelope.
///
/// The first three variants are the stable validation outcomes surfaced
/// to the delivery protocol as distinct response codes; the codec variants
/// cover bincode failures on individual sections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    /// The envelope bytes are too short or a section length points past
    /// the end of the buffer.
    #[error("invalid tx envelope bytes")]
    InvalidTxBytes,

    /// The bulletin section is missing or its fields fail validation.
    #[error("invalid bulletin fields")]
    InvalidBulletinFields,

    /// The stochastic-payment section is present but its fields fail
    /// validation.
    #[error("invalid stochastic payment fields")]
    InvalidStochasticPaymentFields,

    /// A section payload could not be decoded.
    #[error("section decode failed: {0}")]
    Decode(String),

    /// A message could not be encoded while assembling an envelope.
    #[error("section encode failed: {0}")]
    Encode(String),
}
