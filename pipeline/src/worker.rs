//! The per-proof pipeline state machine.

use crate::error::PipelineError;
use crate::stt::Transcriber;
use crate::vision::{AnalysisRequest, AnalysisVerdict, Analyzer};
use sidequest_claims::{ClaimError, ClaimLedger};
use sidequest_media::MediaStore;
use sidequest_store::Store;
use sidequest_types::{DecidedBy, JobStatus, ProofId, ProtocolParams, Timestamp};
use std::sync::Arc;

/// Runs one verification job end to end. One worker instance serves every
/// job; per-job state lives in the store.
pub struct VerificationWorker {
    store: Arc<dyn Store>,
    media: Arc<dyn MediaStore>,
    transcriber: Arc<dyn Transcriber>,
    analyzer: Arc<dyn Analyzer>,
    ledger: Arc<ClaimLedger>,
    params: ProtocolParams,
}

impl VerificationWorker {
    pub fn new(
        store: Arc<dyn Store>,
        media: Arc<dyn MediaStore>,
        transcriber: Arc<dyn Transcriber>,
        analyzer: Arc<dyn Analyzer>,
        ledger: Arc<ClaimLedger>,
        params: ProtocolParams,
    ) -> Self {
        Self {
            store,
            media,
            transcriber,
            analyzer,
            ledger,
            params,
        }
    }

    /// Process one proof through transcription, analysis, and decision.
    ///
    /// Collaborator failures degrade (empty transcript / escalation verdict)
    /// rather than erroring; an `Err` here means the job itself is broken
    /// (missing records) and goes back to the queue's retry policy.
    pub async fn process(&self, proof_id: &ProofId) -> Result<(), PipelineError> {
        let proof = self
            .store
            .get_proof(proof_id)
            .map_err(|_| PipelineError::MissingRecord(format!("proof {proof_id}")))?;
        let claim = self
            .store
            .get_claim(&proof.claim)
            .map_err(|_| PipelineError::MissingRecord(format!("claim {}", proof.claim)))?;
        let quest = self
            .store
            .get_quest(&claim.quest)
            .map_err(|_| PipelineError::MissingRecord(format!("quest {}", claim.quest)))?;
        let job = self.store.get_job_by_proof(proof_id)?;

        // Stage 1: transcription. Failures are non-fatal.
        self.store
            .set_job_status(&job.id, JobStatus::Transcribing, Timestamp::now())?;

        let mut transcript = String::new();
        let video_key = self.media.video_key_from_url(&proof.video_url);
        match self.media.get_video(&video_key) {
            Ok(Some(video)) => match self.transcriber.transcribe(video).await {
                Ok(text) => transcript = text,
                Err(err) => {
                    tracing::warn!(proof = %proof_id, %err, "transcription failed, continuing without");
                }
            },
            Ok(None) => {
                tracing::warn!(proof = %proof_id, key = %video_key, "video blob missing, continuing without transcript");
            }
            Err(err) => {
                tracing::warn!(proof = %proof_id, %err, "video fetch failed, continuing without transcript");
            }
        }
        self.store.set_transcript(proof_id, &transcript)?;

        // Stage 2: multimodal analysis. Failures degrade to escalation.
        self.store
            .set_job_status(&job.id, JobStatus::Analyzing, Timestamp::now())?;

        let frames = self.media.get_frames(&claim.id).unwrap_or_else(|err| {
            tracing::warn!(claim = %claim.id, %err, "frame fetch failed, analyzing without frames");
            Vec::new()
        });
        if frames.is_empty() {
            tracing::warn!(claim = %claim.id, "no evidence frames, analyzing transcript only");
        }

        let verdict = match self
            .analyzer
            .analyze(AnalysisRequest {
                description: quest.description.clone(),
                transcript: transcript.clone(),
                frames,
            })
            .await
        {
            Ok(verdict) => verdict,
            Err(err) => {
                tracing::warn!(proof = %proof_id, %err, "analysis failed, escalating");
                AnalysisVerdict::escalation_fallback()
            }
        };

        let confidence = verdict.confidence.min(100);
        self.store.record_analysis(
            proof_id,
            confidence,
            verdict.decision,
            &verdict.reasoning,
            &verdict.detected_actions,
            &verdict.safety_flags,
        )?;

        // Stage 3: threshold decision.
        self.store
            .set_job_status(&job.id, JobStatus::Deciding, Timestamp::now())?;
        self.decide(&claim.id, confidence, verdict.safety_flagged())
            .await?;

        self.store
            .set_job_status(&job.id, JobStatus::Complete, Timestamp::now())?;
        Ok(())
    }

    /// Apply the threshold policy. Boundaries are inclusive: confidence at
    /// the approve threshold approves, at the reject threshold rejects; a
    /// non-empty safety-flag list rejects regardless of confidence.
    async fn decide(
        &self,
        claim_id: &sidequest_types::ClaimId,
        confidence: u8,
        safety_flagged: bool,
    ) -> Result<(), PipelineError> {
        let outcome = if confidence >= self.params.auto_approve_confidence && !safety_flagged {
            self.ledger
                .finalize_approval(claim_id, DecidedBy::Ai)
                .await
                .map(|_| "auto-approved")
        } else if confidence <= self.params.auto_reject_confidence || safety_flagged {
            self.ledger
                .finalize_rejection(claim_id, DecidedBy::Ai, safety_flagged)
                .await
                .map(|_| "auto-rejected")
        } else {
            tracing::info!(claim = %claim_id, confidence, "uncertain, escalated to creator review");
            return Ok(());
        };

        match outcome {
            Ok(what) => {
                tracing::info!(claim = %claim_id, confidence, "{what}");
                Ok(())
            }
            // Someone (creator, crank) resolved the claim while the job ran.
            Err(ClaimError::ClaimNotSubmitted) => {
                tracing::warn!(claim = %claim_id, "claim already resolved, decision skipped");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Record a failed attempt. Returns the new attempt count.
    pub fn record_retry(&self, proof_id: &ProofId, error: &str) -> Result<u32, PipelineError> {
        let job = self.store.get_job_by_proof(proof_id)?;
        self.store.set_job_error(&job.id, error)?;
        Ok(self.store.increment_attempt(&job.id)?)
    }

    /// Exhausted retries: mark the job dead.
    pub fn mark_dead(&self, proof_id: &ProofId, error: &str) -> Result<(), PipelineError> {
        let job = self.store.get_job_by_proof(proof_id)?;
        self.store.set_job_error(&job.id, error)?;
        self.store
            .set_job_status(&job.id, JobStatus::Failed, Timestamp::now())?;
        tracing::error!(proof = %proof_id, error, "verification job dead-lettered");
        Ok(())
    }
}
