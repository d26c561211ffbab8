use sidequest_moderation::ModerationError;
use sidequest_store::StoreError;
use sidequest_types::{QuestId, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    // Validation failures, surfaced to the caller with the specific reason.
    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error("direct quests require a target")]
    MissingTarget,

    #[error("cannot target yourself")]
    SelfTarget,

    #[error("reward too low (minimum {minimum})")]
    RewardTooLow { minimum: TokenAmount },

    #[error("max claimers must be 1-{limit}")]
    InvalidMaxClaimers { limit: u32 },

    // Conflicts: the quest exists but is in the wrong state.
    #[error("only the creator can cancel a quest")]
    NotCreator,

    #[error("quest is not active")]
    NotActive,

    #[error("quest has active claims")]
    HasClaimers,

    #[error("quest not found: {0}")]
    NotFound(QuestId),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => RegistryError::NotFound(QuestId::new(id)),
            other => RegistryError::Store(other),
        }
    }
}
