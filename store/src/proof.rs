//! Proof storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use sidequest_types::{
    AiDecision, ClaimId, DecidedBy, ProofDecision, ProofId, Timestamp, TxSignature,
};

/// A submitted proof and everything the pipeline learned about it.
///
/// Exactly one proof exists per claim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofRecord {
    pub id: ProofId,
    pub claim: ClaimId,
    pub video_url: String,
    pub video_hash: String,
    pub duration_secs: u32,
    pub transcript: Option<String>,
    /// AI confidence in [0, 100].
    pub ai_confidence: Option<u8>,
    pub ai_decision: Option<AiDecision>,
    pub ai_reasoning: Option<String>,
    pub detected_actions: Vec<String>,
    pub safety_flags: Vec<String>,
    pub final_decision: Option<ProofDecision>,
    pub decided_by: Option<DecidedBy>,
    /// Settlement transaction reference; `None` after a decision means
    /// "outcome decided, settlement pending".
    pub settlement_tx: Option<TxSignature>,
    pub created_at: Timestamp,
}

/// Trait for proof storage operations. Mutations are targeted setters so
/// each pipeline stage writes exactly the fields it owns.
pub trait ProofStore {
    fn put_proof(&self, proof: &ProofRecord) -> Result<(), StoreError>;

    fn get_proof(&self, id: &ProofId) -> Result<ProofRecord, StoreError>;

    fn get_proof_by_claim(&self, claim: &ClaimId) -> Result<ProofRecord, StoreError>;

    fn set_transcript(&self, id: &ProofId, transcript: &str) -> Result<(), StoreError>;

    /// Record the multimodal analysis verdict fields.
    #[allow(clippy::too_many_arguments)]
    fn record_analysis(
        &self,
        id: &ProofId,
        confidence: u8,
        decision: AiDecision,
        reasoning: &str,
        detected_actions: &[String],
        safety_flags: &[String],
    ) -> Result<(), StoreError>;

    /// Record the final decision and who made it.
    fn record_decision(
        &self,
        id: &ProofId,
        decision: ProofDecision,
        decided_by: DecidedBy,
    ) -> Result<(), StoreError>;

    fn set_settlement_tx(&self, id: &ProofId, tx: &TxSignature) -> Result<(), StoreError>;
}
