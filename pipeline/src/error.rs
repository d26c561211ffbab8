use sidequest_claims::ClaimError;
use sidequest_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A record the job needs is gone. Unrecoverable for this job.
    #[error("missing record: {0}")]
    MissingRecord(String),

    /// A collaborator call failed. Absorbed by the degradation policy
    /// inside the worker; only surfaces from the collaborator clients.
    #[error("external service error: {0}")]
    External(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Claim(#[from] ClaimError),
}
