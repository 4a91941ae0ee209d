//! Domain errors and the stable delivery response codes.

use std::fmt;

use bulletin_proto::ProtoError;

/// Errors from the storage state machine and the read paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A non-censor creation declared a timestamp more than the configured
    /// window behind the block time.
    TimestampTooLong { timestamp: i64, block_time: i64 },

    /// The overwrite back-pointer is present but not a serial number.
    InvalidOldSn { len: usize },

    /// No main record exists at the key the overwrite targets.
    CantFindOldBulletin,

    /// The stored bulletin and the arriving one disagree on an
    /// identity-bearing field.
    CantOverwriteBulletin,

    /// No slot-range bucket exists for the URL's block coordinates.
    KeyNotFound,

    /// The URL's positional index points past the end of the bucket.
    MainKeyHeadNotFound { index: usize, entries: usize },

    /// A URL or its string form failed to parse.
    InvalidUrl { message: String },

    /// An envelope section failed to encode or decode mid-operation.
    Codec { message: String },

    /// Underlying store failure.
    Store { message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::TimestampTooLong {
                timestamp,
                block_time,
            } => {
                write!(
                    f,
                    "timestamp is too long ago: declared {}, block time {}",
                    timestamp, block_time
                )
            }
            StoreError::InvalidOldSn { len } => {
                write!(f, "invalid old SN: {} bytes", len)
            }
            StoreError::CantFindOldBulletin => write!(f, "can't find old bulletin"),
            StoreError::CantOverwriteBulletin => write!(f, "can't overwrite old bulletin"),
            StoreError::KeyNotFound => write!(f, "key not found"),
            StoreError::MainKeyHeadNotFound { index, entries } => {
                write!(
                    f,
                    "main key head not found: slot {} of {} entries",
                    index, entries
                )
            }
            StoreError::InvalidUrl { message } => write!(f, "invalid gany url: {}", message),
            StoreError::Codec { message } => write!(f, "envelope codec error: {}", message),
            StoreError::Store { message } => write!(f, "store error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ProtoError> for StoreError {
    fn from(err: ProtoError) -> Self {
        StoreError::Codec {
            message: err.to_string(),
        }
    }
}

impl From<KvError> for StoreError {
    fn from(err: KvError) -> Self {
        StoreError::Store {
            message: err.to_string(),
        }
    }
}

/// Ordered-KV port errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// I/O failure in the backing store.
    Io { message: String },
    /// The store surfaced corrupt data.
    Corruption { message: String },
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvError::Io { message } => write!(f, "kv store I/O error: {}", message),
            KvError::Corruption { message } => write!(f, "kv store corruption: {}", message),
        }
    }
}

impl std::error::Error for KvError {}

/// Stable numeric response codes of the delivery protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResponseCode {
    Ok = 0,
    InvalidTxBytes = 1,
    InvalidBulletin = 2,
    InvalidStochasticPayment = 3,
    Error = 99,
    TimestampTooLong = 100,
    InvalidOldSn = 101,
    CantFindOldBulletin = 102,
    CantOverwriteBulletin = 103,
    Other = 104,
}

impl ResponseCode {
    /// The wire value.
    pub const fn value(self) -> u32 {
        self as u32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, ResponseCode::Ok)
    }
}

impl From<&ProtoError> for ResponseCode {
    fn from(err: &ProtoError) -> Self {
        match err {
            ProtoError::InvalidTxBytes => ResponseCode::InvalidTxBytes,
            ProtoError::InvalidBulletinFields => ResponseCode::InvalidBulletin,
            ProtoError::InvalidStochasticPaymentFields => ResponseCode::InvalidStochasticPayment,
            ProtoError::Decode(_) | ProtoError::Encode(_) => ResponseCode::Error,
        }
    }
}

impl From<&StoreError> for ResponseCode {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::TimestampTooLong { .. } => ResponseCode::TimestampTooLong,
            StoreError::InvalidOldSn { .. } => ResponseCode::InvalidOldSn,
            StoreError::CantFindOldBulletin => ResponseCode::CantFindOldBulletin,
            StoreError::CantOverwriteBulletin => ResponseCode::CantOverwriteBulletin,
            _ => ResponseCode::Other,
        }
    }
}

/// Outcome of one `check_tx` or `deliver_tx` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverResponse {
    pub code: ResponseCode,
    pub log: String,
}

impl DeliverResponse {
    pub fn ok() -> Self {
        Self {
            code: ResponseCode::Ok,
            log: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values_are_stable() {
        assert_eq!(ResponseCode::Ok.value(), 0);
        assert_eq!(ResponseCode::InvalidTxBytes.value(), 1);
        assert_eq!(ResponseCode::InvalidBulletin.value(), 2);
        assert_eq!(ResponseCode::InvalidStochasticPayment.value(), 3);
        assert_eq!(ResponseCode::Error.value(), 99);
        assert_eq!(ResponseCode::TimestampTooLong.value(), 100);
        assert_eq!(ResponseCode::InvalidOldSn.value(), 101);
        assert_eq!(ResponseCode::CantFindOldBulletin.value(), 102);
        assert_eq!(ResponseCode::CantOverwriteBulletin.value(), 103);
        assert_eq!(ResponseCode::Other.value(), 104);
    }

    #[test]
    fn test_store_error_code_mapping() {
        let err = StoreError::TimestampTooLong {
            timestamp: 10,
            block_time: 200,
        };
        assert_eq!(ResponseCode::from(&err), ResponseCode::TimestampTooLong);

        let err = StoreError::Store {
            message: "disk failure".to_string(),
        };
        assert_eq!(ResponseCode::from(&err), ResponseCode::Other);
    }

    #[test]
    fn test_proto_error_code_mapping() {
        assert_eq!(
            ResponseCode::from(&ProtoError::InvalidBulletinFields),
            ResponseCode::InvalidBulletin
        );
        assert_eq!(
            ResponseCode::from(&ProtoError::Decode("bad".to_string())),
            ResponseCode::Error
        );
    }

    #[test]
    fn test_kv_error_conversion() {
        let err = KvError::Io {
            message: "disk failure".to_string(),
        };
        let store_err: StoreError = err.into();
        match store_err {
            StoreError::Store { message } => assert!(message.contains("disk failure")),
            other => panic!("expected Store, got {:?}", other),
        }
    }
}
