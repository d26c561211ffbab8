//! The verification job queue.
//!
//! In-process message queue with the broker semantics the pipeline expects:
//! a message is consumed once per delivery attempt, acknowledged by
//! successful processing, and requeued on error until the attempt budget is
//! spent, after which the job is dead-lettered (`JobStatus::Failed`).

use crate::worker::VerificationWorker;
use serde::{Deserialize, Serialize};
use sidequest_claims::ProofSink;
use sidequest_types::ProofId;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// The wire shape of one queue message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueMessage {
    pub proof_id: ProofId,
}

/// Producer handle. Cheap to clone; also the [`ProofSink`] the claim ledger
/// enqueues into.
#[derive(Clone)]
pub struct VerificationQueue {
    tx: mpsc::UnboundedSender<QueueMessage>,
}

impl VerificationQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QueueMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, message: QueueMessage) -> Result<(), String> {
        self.tx
            .send(message)
            .map_err(|_| "verification queue closed".to_string())
    }
}

impl ProofSink for VerificationQueue {
    fn enqueue(&self, proof: &ProofId) -> Result<(), String> {
        self.send(QueueMessage {
            proof_id: proof.clone(),
        })
    }
}

/// Consumer loop: one concurrent task per in-flight message, bounded by a
/// semaphore. Jobs across proofs run concurrently; within one job the
/// stages are strictly sequential (the worker is a plain async fn).
pub struct QueueConsumer {
    worker: Arc<VerificationWorker>,
    queue: VerificationQueue,
    rx: mpsc::UnboundedReceiver<QueueMessage>,
    max_attempts: u32,
    permits: Arc<Semaphore>,
}

impl QueueConsumer {
    pub fn new(
        worker: Arc<VerificationWorker>,
        queue: VerificationQueue,
        rx: mpsc::UnboundedReceiver<QueueMessage>,
        max_attempts: u32,
        max_concurrency: usize,
    ) -> Self {
        Self {
            worker,
            queue,
            rx,
            max_attempts,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Run until every producer handle is dropped.
    pub async fn run(mut self) {
        while let Some(message) = self.rx.recv().await {
            let permit = self
                .permits
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore never closed");
            let worker = self.worker.clone();
            let queue = self.queue.clone();
            let max_attempts = self.max_attempts;

            tokio::spawn(async move {
                let _permit = permit;
                let proof_id = message.proof_id.clone();
                match worker.process(&proof_id).await {
                    Ok(()) => {} // acknowledged by consumption
                    Err(err) => {
                        tracing::warn!(proof = %proof_id, %err, "verification attempt failed");
                        handle_failure(&worker, &queue, &proof_id, &err.to_string(), max_attempts);
                    }
                }
            });
        }
    }
}

/// Requeue a failed message or dead-letter it once attempts are exhausted.
fn handle_failure(
    worker: &VerificationWorker,
    queue: &VerificationQueue,
    proof_id: &ProofId,
    error: &str,
    max_attempts: u32,
) {
    match worker.record_retry(proof_id, error) {
        Ok(attempt) if attempt <= max_attempts => {
            if let Err(err) = queue.enqueue(proof_id) {
                tracing::error!(proof = %proof_id, %err, "requeue failed");
            }
        }
        Ok(_) => {
            if let Err(err) = worker.mark_dead(proof_id, error) {
                tracing::error!(proof = %proof_id, %err, "dead-letter bookkeeping failed");
            }
        }
        Err(err) => {
            // No job row to track attempts against; nothing left to do.
            tracing::error!(proof = %proof_id, %err, "retry bookkeeping failed");
        }
    }
}
