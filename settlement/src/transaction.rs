//! Transaction assembly and signing.

use crate::error::SettlementError;
use crate::instruction::Instruction;
use serde::{Deserialize, Serialize};
use sidequest_crypto::sign_message;
use sidequest_types::{Address, KeyPair, PublicKey, Signature};

/// An unsigned transaction: a single instruction plus its fee payer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub instruction: Instruction,
    pub fee_payer: Address,
}

impl Transaction {
    pub fn new(instruction: Instruction, fee_payer: Address) -> Self {
        Self {
            instruction,
            fee_payer,
        }
    }

    /// The canonical byte encoding that gets signed.
    pub fn message_bytes(&self) -> Result<Vec<u8>, SettlementError> {
        bincode::serialize(self).map_err(|e| SettlementError::Serialization(e.to_string()))
    }
}

/// A transaction with its Ed25519 signature attached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signer: PublicKey,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Convenience accessor for the signed instruction.
    pub fn instruction(&self) -> &Instruction {
        &self.transaction.instruction
    }
}

/// Sign a transaction's message bytes with the settlement identity.
pub fn sign_transaction(
    transaction: Transaction,
    keypair: &KeyPair,
) -> Result<SignedTransaction, SettlementError> {
    let message = transaction.message_bytes()?;
    let signature = sign_message(&message, &keypair.private);
    Ok(SignedTransaction {
        transaction,
        signer: keypair.public.clone(),
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{approve_completion, ApproveAccounts};
    use sidequest_crypto::{keypair_from_seed, verify_signature};

    fn addr(s: &str) -> Address {
        Address::new(format!("sq_{s}"))
    }

    fn transaction() -> Transaction {
        let ix = approve_completion(
            addr("program"),
            ApproveAccounts {
                config: addr("config"),
                quest: addr("quest"),
                claim: addr("claim"),
                escrow: addr("escrow"),
                claimer_account: addr("claimer"),
                treasury: addr("treasury"),
                authority: addr("authority"),
            },
        );
        Transaction::new(ix, addr("authority"))
    }

    #[test]
    fn signature_verifies_over_message_bytes() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let signed = sign_transaction(transaction(), &kp).unwrap();
        let message = signed.transaction.message_bytes().unwrap();
        assert!(verify_signature(&message, &signed.signature, &signed.signer));
    }

    #[test]
    fn message_bytes_are_deterministic() {
        let a = transaction().message_bytes().unwrap();
        let b = transaction().message_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signed_transaction_round_trips_bincode() {
        let kp = keypair_from_seed(&[4u8; 32]);
        let signed = sign_transaction(transaction(), &kp).unwrap();
        let bytes = bincode::serialize(&signed).unwrap();
        let back: SignedTransaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.signature, signed.signature);
        assert!(back.instruction().is_method("approve_completion"));
    }
}
