use sidequest_store::StoreError;
use sidequest_types::{ClaimId, QuestId, TokenAmount};
use thiserror::Error;

/// Everything that can go wrong in the claim lifecycle. Validation variants
/// name the specific rule that failed; conflict variants mean the entity is
/// in the wrong state for the operation.
#[derive(Debug, Error)]
pub enum ClaimError {
    // ── Eligibility (validation) ─────────────────────────────────────────
    #[error("quest not found: {0}")]
    QuestNotFound(QuestId),

    #[error("quest is not active")]
    QuestNotActive,

    #[error("quest deadline has passed")]
    QuestDeadlinePassed,

    #[error("quest is full")]
    QuestFull,

    #[error("cannot claim your own quest")]
    OwnQuest,

    #[error("max {limit} active claims")]
    TooManyActiveClaims { limit: u32 },

    #[error("too many expired or abandoned claims recently ({count} in window)")]
    RecentForfeits { count: u32 },

    #[error("stake too low (minimum {minimum}, provided {provided})")]
    StakeTooLow {
        minimum: TokenAmount,
        provided: TokenAmount,
    },

    #[error("this quest is not for you")]
    NotTargeted,

    #[error("you already have a claim on this quest")]
    AlreadyClaimed,

    // ── Claim operations (conflicts / auth) ──────────────────────────────
    #[error("claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error("not your claim")]
    NotClaimOwner,

    #[error("claim is not active")]
    ClaimNotActive,

    #[error("proof deadline has passed")]
    ProofDeadlinePassed,

    #[error("claim is not submitted")]
    ClaimNotSubmitted,

    #[error("not your quest")]
    NotQuestCreator,

    #[error("missing evidence field: {0}")]
    MissingEvidence(&'static str),

    // ── Infrastructure ───────────────────────────────────────────────────
    #[error("verification queue error: {0}")]
    Queue(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
