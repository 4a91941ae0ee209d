//! Stochastic-payment voucher carried alongside a bulletin.

use serde::{Deserialize, Serialize};

use crate::bulletin::ADDRESS_LEN;
use crate::errors::ProtoError;

/// Maximum encoded length of a payment amount.
pub const MAX_AMOUNT_LEN: usize = 12;

/// Length of a recoverable secp256k1 signature (r || s || v).
pub const SIGNATURE_LEN: usize = 65;

/// A probabilistic micropayment authorization.
///
/// The registry only checks field shapes; signature recovery and on-chain
/// settlement belong to the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochasticPayment {
    /// Merkle root over the validator public-key hashes, 32 bytes.
    pub validator_pubkey_hash_root: Vec<u8>,
    /// Payment deadline, unix seconds.
    pub due_time: i64,
    /// Win probability, fixed-point over the full u32 range.
    pub probability: u32,
    /// Payee address; empty means pay-to-validator only.
    pub payee: Vec<u8>,
    pub amount_to_payee: Vec<u8>,
    pub amount_to_validator: Vec<u8>,
    /// Replay-protection nonces already observed by the payer.
    pub nonces: Vec<u8>,
    pub signature: Vec<u8>,
}

impl StochasticPayment {
    pub fn is_valid(&self) -> bool {
        self.validator_pubkey_hash_root.len() == 32
            && self.due_time > 0
            && self.probability > 0
            && (self.payee.is_empty() || self.payee.len() == ADDRESS_LEN)
            && self.amount_to_payee.len() <= MAX_AMOUNT_LEN
            && self.amount_to_validator.len() <= MAX_AMOUNT_LEN
            && self.signature.len() == SIGNATURE_LEN
    }

    pub fn validate(&self) -> Result<(), ProtoError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ProtoError::InvalidStochasticPaymentFields)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StochasticPayment {
        StochasticPayment {
            validator_pubkey_hash_root: vec![0x11; 32],
            due_time: 1_700_000_000,
            probability: 1 << 30,
            payee: vec![0x22; ADDRESS_LEN],
            amount_to_payee: vec![0x01, 0x00],
            amount_to_validator: vec![0x02],
            nonces: vec![0x00; 8],
            signature: vec![0x33; SIGNATURE_LEN],
        }
    }

    #[test]
    fn test_valid_payment() {
        assert!(sample().is_valid());
    }

    #[test]
    fn test_empty_payee_allowed() {
        let mut p = sample();
        p.payee.clear();
        assert!(p.is_valid());
    }

    #[test]
    fn test_bad_root_length() {
        let mut p = sample();
        p.validator_pubkey_hash_root.pop();
        assert_eq!(p.validate(), Err(ProtoError::InvalidStochasticPaymentFields));
    }

    #[test]
    fn test_amount_too_long() {
        let mut p = sample();
        p.amount_to_payee = vec![0u8; MAX_AMOUNT_LEN + 1];
        assert!(!p.is_valid());
    }

    #[test]
    fn test_bad_signature_length() {
        let mut p = sample();
        p.signature.truncate(64);
        assert!(!p.is_valid());
    }
}
