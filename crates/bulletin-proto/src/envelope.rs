//! The transaction envelope: framing, section access, and the bulletin ID.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::auth::{AuthChallenge, AuthProof};
use crate::bulletin::Bulletin;
use crate::errors::ProtoError;
use crate::payment::StochasticPayment;

/// Length of the envelope header: four big-endian u32 section lengths.
pub const ENVELOPE_HEADER_LEN: usize = 16;

/// Length of a bulletin ID in bytes.
pub const BULLETIN_ID_LEN: usize = 64;

/// 64-byte bulletin content identifier.
pub type BulletinId = [u8; BULLETIN_ID_LEN];

const SECTION_PAYMENT: usize = 0;
const SECTION_BULLETIN: usize = 1;
const SECTION_AUTH_PROOF: usize = 2;
const SECTION_AUTH_CHALLENGE: usize = 3;

/// An owned, opaque transaction envelope.
///
/// Layout: `Header16 || SP || BUL || AP || AC`, where the header carries
/// the four section lengths as big-endian u32 values. The storage engine
/// treats the whole envelope as the persisted payload and only slices out
/// sections on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxEnvelope {
    bytes: Vec<u8>,
}

impl TxEnvelope {
    /// Wrap raw bytes without validation; call [`TxEnvelope::validate`]
    /// before trusting the contents.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Assemble an envelope from its four messages. Absent sections are
    /// encoded with length zero.
    pub fn assemble(
        payment: Option<&StochasticPayment>,
        bulletin: &Bulletin,
        auth_proof: Option<&AuthProof>,
        auth_challenge: Option<&AuthChallenge>,
    ) -> Result<Self, ProtoError> {
        let sp = encode_opt(payment)?;
        let bul = encode(bulletin)?;
        let ap = encode_opt(auth_proof)?;
        let ac = encode_opt(auth_challenge)?;

        let mut bytes =
            Vec::with_capacity(ENVELOPE_HEADER_LEN + sp.len() + bul.len() + ap.len() + ac.len());
        for section in [&sp, &bul, &ap, &ac] {
            bytes.extend_from_slice(&(section.len() as u32).to_be_bytes());
        }
        bytes.extend_from_slice(&sp);
        bytes.extend_from_slice(&bul);
        bytes.extend_from_slice(&ap);
        bytes.extend_from_slice(&ac);
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn section_len(&self, idx: usize) -> Result<usize, ProtoError> {
        if self.bytes.len() < ENVELOPE_HEADER_LEN {
            return Err(ProtoError::InvalidTxBytes);
        }
        let off = idx * 4;
        Ok(be_u32(&self.bytes[off..off + 4]) as usize)
    }

    /// Slice out one section; empty slice when the section is absent.
    fn section(&self, idx: usize) -> Result<&[u8], ProtoError> {
        let mut start = ENVELOPE_HEADER_LEN;
        for prior in 0..idx {
            start += self.section_len(prior)?;
        }
        let len = self.section_len(idx)?;
        let end = start
            .checked_add(len)
            .ok_or(ProtoError::InvalidTxBytes)?;
        if self.bytes.len() < end {
            return Err(ProtoError::InvalidTxBytes);
        }
        Ok(&self.bytes[start..end])
    }

    pub fn payment_bytes(&self) -> Result<&[u8], ProtoError> {
        self.section(SECTION_PAYMENT)
    }

    pub fn bulletin_bytes(&self) -> Result<&[u8], ProtoError> {
        self.section(SECTION_BULLETIN)
    }

    pub fn auth_proof_bytes(&self) -> Result<&[u8], ProtoError> {
        self.section(SECTION_AUTH_PROOF)
    }

    pub fn auth_challenge_bytes(&self) -> Result<&[u8], ProtoError> {
        self.section(SECTION_AUTH_CHALLENGE)
    }

    pub fn payment(&self) -> Result<Option<StochasticPayment>, ProtoError> {
        decode_opt(self.payment_bytes()?)
    }

    /// Decode the bulletin section. An envelope without a bulletin is not
    /// a meaningful transaction, so absence is an error here.
    pub fn bulletin(&self) -> Result<Bulletin, ProtoError> {
        let bz = self.bulletin_bytes()?;
        if bz.is_empty() {
            return Err(ProtoError::InvalidBulletinFields);
        }
        bincode::deserialize(bz).map_err(|e| ProtoError::Decode(e.to_string()))
    }

    pub fn auth_proof(&self) -> Result<Option<AuthProof>, ProtoError> {
        decode_opt(self.auth_proof_bytes()?)
    }

    pub fn auth_challenge(&self) -> Result<Option<AuthChallenge>, ProtoError> {
        decode_opt(self.auth_challenge_bytes()?)
    }

    /// Stateless validation: framing bounds, then payment fields when the
    /// section is present, then bulletin fields.
    pub fn validate(&self) -> Result<(), ProtoError> {
        if self.bytes.len() <= ENVELOPE_HEADER_LEN {
            return Err(ProtoError::InvalidTxBytes);
        }
        // Checking the last section's bounds walks every length.
        self.section(SECTION_AUTH_CHALLENGE)?;

        if let Some(payment) = self
            .payment()
            .map_err(|_| ProtoError::InvalidTxBytes)?
        {
            payment.validate()?;
        }

        let bulletin = match self.bulletin() {
            Ok(b) => b,
            Err(ProtoError::InvalidBulletinFields) => {
                return Err(ProtoError::InvalidBulletinFields)
            }
            Err(_) => return Err(ProtoError::InvalidTxBytes),
        };
        bulletin.validate()
    }

    /// Derive the 64-byte bulletin ID.
    ///
    /// First half: SHA-256 over the first two bytes of the bulletin
    /// section and the first two bytes of the auth-proof section (each
    /// contributing only when longer than two bytes). Second half:
    /// SHA-256 over the whole auth-challenge section, hashing the empty
    /// input when it is absent.
    pub fn bulletin_id(&self) -> Result<BulletinId, ProtoError> {
        let mut id = [0u8; BULLETIN_ID_LEN];

        let mut hasher = Sha256::new();
        let bul = self.bulletin_bytes()?;
        if bul.len() > 2 {
            hasher.update(&bul[..2]);
        }
        let ap = self.auth_proof_bytes()?;
        if ap.len() > 2 {
            hasher.update(&ap[..2]);
        }
        id[..32].copy_from_slice(&hasher.finalize());

        let mut hasher = Sha256::new();
        let ac = self.auth_challenge_bytes()?;
        if !ac.is_empty() {
            hasher.update(ac);
        }
        id[32..].copy_from_slice(&hasher.finalize());

        Ok(id)
    }
}

fn be_u32(b: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&b[..4]);
    u32::from_be_bytes(buf)
}

fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtoError> {
    bincode::serialize(msg).map_err(|e| ProtoError::Encode(e.to_string()))
}

fn encode_opt<T: Serialize>(msg: Option<&T>) -> Result<Vec<u8>, ProtoError> {
    match msg {
        Some(m) => encode(m),
        None => Ok(Vec::new()),
    }
}

fn decode_opt<T: DeserializeOwned>(bz: &[u8]) -> Result<Option<T>, ProtoError> {
    if bz.is_empty() {
        return Ok(None);
    }
    bincode::deserialize(bz)
        .map(Some)
        .map_err(|e| ProtoError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulletin::BulletinType;
    use crate::payment::SIGNATURE_LEN;

    fn sample_bulletin() -> Bulletin {
        Bulletin {
            bulletin_type: BulletinType::Blog,
            topic: vec![0x12],
            timestamp: 1_700_000_000,
            duration: 1_700_003_600,
            old_sn: Vec::new(),
            from: [0x06; 20],
            content_type: "text/plain".to_string(),
            content_list: vec![vec![1, 2]],
            censored_start: 0,
            censored_end: 0,
        }
    }

    fn sample_payment() -> StochasticPayment {
        StochasticPayment {
            validator_pubkey_hash_root: vec![0x11; 32],
            due_time: 1_700_000_000,
            probability: 7,
            payee: Vec::new(),
            amount_to_payee: vec![0x01],
            amount_to_validator: vec![0x02],
            nonces: Vec::new(),
            signature: vec![0x33; SIGNATURE_LEN],
        }
    }

    #[test]
    fn test_assemble_round_trip() {
        let bulletin = sample_bulletin();
        let payment = sample_payment();
        let proof = AuthProof::default();

        let envelope =
            TxEnvelope::assemble(Some(&payment), &bulletin, Some(&proof), None).unwrap();

        assert_eq!(envelope.bulletin().unwrap(), bulletin);
        assert_eq!(envelope.payment().unwrap(), Some(payment));
        assert_eq!(envelope.auth_proof().unwrap(), Some(proof));
        assert_eq!(envelope.auth_challenge().unwrap(), None);
        assert!(envelope.auth_challenge_bytes().unwrap().is_empty());
    }

    #[test]
    fn test_validate_ok_without_payment() {
        let envelope = TxEnvelope::assemble(None, &sample_bulletin(), None, None).unwrap();
        assert!(envelope.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_buffer() {
        let envelope = TxEnvelope::from_bytes(vec![0u8; ENVELOPE_HEADER_LEN]);
        assert_eq!(envelope.validate(), Err(ProtoError::InvalidTxBytes));
    }

    #[test]
    fn test_validate_rejects_truncated_section() {
        let bulletin = sample_bulletin();
        let envelope = TxEnvelope::assemble(None, &bulletin, None, None).unwrap();
        let mut bytes = envelope.into_bytes();
        bytes.truncate(bytes.len() - 1);
        let truncated = TxEnvelope::from_bytes(bytes);
        assert_eq!(truncated.validate(), Err(ProtoError::InvalidTxBytes));
    }

    #[test]
    fn test_validate_rejects_bad_payment() {
        let mut payment = sample_payment();
        payment.signature.truncate(10);
        let envelope =
            TxEnvelope::assemble(Some(&payment), &sample_bulletin(), None, None).unwrap();
        assert_eq!(
            envelope.validate(),
            Err(ProtoError::InvalidStochasticPaymentFields)
        );
    }

    #[test]
    fn test_validate_rejects_bad_bulletin() {
        let mut bulletin = sample_bulletin();
        bulletin.topic.clear();
        let envelope = TxEnvelope::assemble(None, &bulletin, None, None).unwrap();
        assert_eq!(envelope.validate(), Err(ProtoError::InvalidBulletinFields));
    }

    #[test]
    fn test_bulletin_id_deterministic() {
        let bulletin = sample_bulletin();
        let a = TxEnvelope::assemble(None, &bulletin, None, None).unwrap();
        let b = TxEnvelope::assemble(None, &bulletin, None, None).unwrap();
        assert_eq!(a.bulletin_id().unwrap(), b.bulletin_id().unwrap());
    }

    #[test]
    fn test_bulletin_id_depends_on_challenge() {
        let bulletin = sample_bulletin();
        let without = TxEnvelope::assemble(None, &bulletin, None, None).unwrap();
        let challenge = AuthChallenge::default();
        let with =
            TxEnvelope::assemble(None, &bulletin, None, Some(&challenge)).unwrap();

        let id_without = without.bulletin_id().unwrap();
        let id_with = with.bulletin_id().unwrap();
        assert_eq!(id_without[..32], id_with[..32]);
        assert_ne!(id_without[32..], id_with[32..]);
    }
}
