use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("ledger rejected transaction: {0}")]
    Rejected(String),

    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("{method} timed out after {secs}s")]
    Timeout { method: String, secs: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}
