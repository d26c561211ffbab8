use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("status conflict on {entity}: expected {expected}, found {actual}")]
    StatusConflict {
        entity: String,
        expected: String,
        actual: String,
    },

    #[error("no claimer slots left on quest {0}")]
    SlotsExhausted(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
