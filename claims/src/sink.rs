//! Hand-off point between proof submission and the verification pipeline.

use sidequest_types::ProofId;
use std::sync::Mutex;

/// Accepts freshly submitted proofs for asynchronous verification.
///
/// The pipeline's queue implements this; the ledger only knows that a proof
/// can be handed off.
pub trait ProofSink: Send + Sync {
    fn enqueue(&self, proof: &ProofId) -> Result<(), String>;
}

/// Records enqueued proofs instead of processing them. For tests.
#[derive(Default)]
pub struct NullSink {
    enqueued: Mutex<Vec<ProofId>>,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued(&self) -> Vec<ProofId> {
        self.enqueued.lock().unwrap().clone()
    }
}

impl ProofSink for NullSink {
    fn enqueue(&self, proof: &ProofId) -> Result<(), String> {
        self.enqueued.lock().unwrap().push(proof.clone());
        Ok(())
    }
}
