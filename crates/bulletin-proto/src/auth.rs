//! Auth proof and challenge carriers.
//!
//! A publisher proves authorization through one of three condition kinds:
//! membership in a dynamically-queried set, membership in a static Merkle
//! set, or an attached stochastic payment. The proofs are verified by the
//! host application; the registry only transports them and can derive the
//! challenge a verifier should answer.

use serde::{Deserialize, Serialize};

/// Proof that an external contract call places the author in a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSetProof {
    pub chain_id: Vec<u8>,
    pub target_contract: Vec<u8>,
    pub function_selector: u32,
    pub out_data: Vec<u8>,
    pub authenticator: Vec<u8>,
    pub authenticator_signature: Vec<u8>,
    pub timestamp: i64,
    pub max_time_difference: i64,
}

/// Merkle-path proof of membership in a static set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSetProof {
    pub root: Vec<u8>,
    pub proof: Vec<u8>,
}

/// Payment terms a stochastic-payment condition must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochasticPayCondition {
    pub payee: Vec<u8>,
    pub amount: Vec<u8>,
    pub probability: u32,
}

/// One conjunctive clause over condition indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndOfConditions {
    pub condition_numbers: Vec<i32>,
}

/// The full proof bundle: three condition lists plus the disjunction of
/// conjunctions that must be satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProof {
    pub dynamic_set_proof_list: Vec<DynamicSetProof>,
    pub static_set_proof_list: Vec<StaticSetProof>,
    pub stochastic_pay_cond_list: Vec<StochasticPayCondition>,
    pub or_of_and_of_conditions: Vec<AndOfConditions>,
}

/// Challenge form of a dynamic-set proof: the public call parameters
/// without the authenticator's signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSetChallenge {
    pub chain_id: Vec<u8>,
    pub target_contract: Vec<u8>,
    pub function_selector: u32,
    pub out_data: Vec<u8>,
    pub authenticator: Vec<u8>,
    pub max_time_difference: i64,
}

/// Challenge form of a static-set proof: the root alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSetChallenge {
    pub root: Vec<u8>,
}

/// What a verifier must answer to accept the corresponding proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    pub dynamic_set_challenge_list: Vec<DynamicSetChallenge>,
    pub static_set_challenge_list: Vec<StaticSetChallenge>,
    pub stochastic_pay_cond_list: Vec<StochasticPayCondition>,
    pub or_of_and_of_conditions: Vec<AndOfConditions>,
}

impl AuthProof {
    /// Project this proof down to the challenge a verifier should answer,
    /// dropping signatures and Merkle paths but keeping every public
    /// parameter.
    pub fn to_challenge(&self) -> AuthChallenge {
        let dynamic = self
            .dynamic_set_proof_list
            .iter()
            .map(|p| DynamicSetChallenge {
                chain_id: p.chain_id.clone(),
                target_contract: p.target_contract.clone(),
                function_selector: p.function_selector,
                out_data: p.out_data.clone(),
                authenticator: p.authenticator.clone(),
                max_time_difference: p.max_time_difference,
            })
            .collect();

        let statics = self
            .static_set_proof_list
            .iter()
            .map(|p| StaticSetChallenge {
                root: p.root.clone(),
            })
            .collect();

        AuthChallenge {
            dynamic_set_challenge_list: dynamic,
            static_set_challenge_list: statics,
            stochastic_pay_cond_list: self.stochastic_pay_cond_list.clone(),
            or_of_and_of_conditions: self.or_of_and_of_conditions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_drops_signature() {
        let proof = AuthProof {
            dynamic_set_proof_list: vec![DynamicSetProof {
                chain_id: vec![0x01],
                target_contract: vec![0x02; 20],
                function_selector: 0xDEAD_BEEF,
                out_data: vec![0x03],
                authenticator: vec![0x04; 20],
                authenticator_signature: vec![0x05; 65],
                timestamp: 1_700_000_000,
                max_time_difference: 60,
            }],
            static_set_proof_list: vec![StaticSetProof {
                root: vec![0x06; 32],
                proof: vec![0x07; 64],
            }],
            stochastic_pay_cond_list: Vec::new(),
            or_of_and_of_conditions: vec![AndOfConditions {
                condition_numbers: vec![1],
            }],
        };

        let challenge = proof.to_challenge();
        assert_eq!(challenge.dynamic_set_challenge_list.len(), 1);
        assert_eq!(
            challenge.dynamic_set_challenge_list[0].function_selector,
            0xDEAD_BEEF
        );
        assert_eq!(challenge.static_set_challenge_list[0].root, vec![0x06; 32]);
        assert_eq!(challenge.or_of_and_of_conditions, proof.or_of_and_of_conditions);
    }
}
