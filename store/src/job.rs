//! Verification job storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use sidequest_types::{JobId, JobStatus, ProofId, Timestamp};

/// Pipeline progress tracking for one proof. Not authoritative state — the
/// proof/claim/quest records are.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationJobRecord {
    pub id: JobId,
    pub proof: ProofId,
    pub status: JobStatus,
    pub attempt: u32,
    pub error: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Trait for verification job storage operations.
pub trait JobStore {
    fn put_job(&self, job: &VerificationJobRecord) -> Result<(), StoreError>;

    fn get_job(&self, id: &JobId) -> Result<VerificationJobRecord, StoreError>;

    fn get_job_by_proof(&self, proof: &ProofId) -> Result<VerificationJobRecord, StoreError>;

    /// Advance the job status, validated against the job transition table.
    /// Stamps `started_at` on the first move out of `Pending` and
    /// `completed_at` on reaching a terminal status.
    fn set_job_status(
        &self,
        id: &JobId,
        to: JobStatus,
        now: Timestamp,
    ) -> Result<VerificationJobRecord, StoreError>;

    /// Increment the delivery attempt counter, returning the new value.
    fn increment_attempt(&self, id: &JobId) -> Result<u32, StoreError>;

    fn set_job_error(&self, id: &JobId, error: &str) -> Result<(), StoreError>;
}
