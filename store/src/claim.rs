//! Claim storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use sidequest_types::{Address, ClaimId, ClaimStatus, QuestId, Timestamp, TokenAmount, UserId};

/// A claim as recorded in the off-chain ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: ClaimId,
    pub quest: QuestId,
    pub claimer: UserId,
    /// The claimer's wallet, denormalized at creation so settlement calls
    /// never need a user-ledger join.
    pub claimer_wallet: Address,
    pub status: ClaimStatus,
    pub stake_amount: TokenAmount,
    pub proof_deadline: Timestamp,
    pub review_deadline: Option<Timestamp>,
    pub claim_address: Address,
    pub created_at: Timestamp,
}

/// Trait for claim storage operations.
///
/// Status changes are compare-and-set: the crank and the pipeline may race
/// ordinary traffic, and an item that already left the expected status must
/// fail with `StatusConflict` so the caller skips it.
pub trait ClaimStore {
    fn put_claim(&self, claim: &ClaimRecord) -> Result<(), StoreError>;

    fn get_claim(&self, id: &ClaimId) -> Result<ClaimRecord, StoreError>;

    /// Compare-and-set the claim status; also validated against the claim
    /// transition table. Returns the updated record.
    fn set_claim_status(
        &self,
        id: &ClaimId,
        from: ClaimStatus,
        to: ClaimStatus,
    ) -> Result<ClaimRecord, StoreError>;

    /// Atomically move an `Active` claim to `Submitted` and stamp its review
    /// deadline. Returns the updated record.
    fn mark_submitted(
        &self,
        id: &ClaimId,
        review_deadline: Timestamp,
    ) -> Result<ClaimRecord, StoreError>;

    /// The claimer's claim on a quest that is still in a non-terminal state,
    /// if any. At most one can exist at a time.
    fn open_claim_for(
        &self,
        quest: &QuestId,
        claimer: &UserId,
    ) -> Result<Option<ClaimRecord>, StoreError>;

    /// Number of this claimer's claims currently in the given status.
    fn count_claims_by_status(
        &self,
        claimer: &UserId,
        status: ClaimStatus,
    ) -> Result<u32, StoreError>;

    /// Number of this claimer's claims that expired or were abandoned and
    /// were created after `since`.
    fn count_recent_forfeits(&self, claimer: &UserId, since: Timestamp)
        -> Result<u32, StoreError>;

    /// Claims still `Active` whose proof deadline is before `now`.
    fn claims_past_proof_deadline(&self, now: Timestamp) -> Result<Vec<ClaimRecord>, StoreError>;

    /// Claims `Submitted` with a review deadline before `now`.
    fn claims_past_review_deadline(&self, now: Timestamp)
        -> Result<Vec<ClaimRecord>, StoreError>;
}
