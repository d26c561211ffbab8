//! Webhook re-trigger for verification jobs.
//!
//! External integrations (or an operator) can re-enqueue a proof by POSTing
//! `{ "proof_id": ... }` signed with HMAC-SHA256 over the raw body. The
//! signature is checked before the body is parsed.

use serde::Deserialize;
use sidequest_claims::ProofSink;
use sidequest_crypto::verify_webhook_signature;
use sidequest_types::ProofId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing webhook signature")]
    MissingSignature,

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("verification queue error: {0}")]
    Queue(String),
}

#[derive(Debug, Deserialize)]
struct RetriggerPayload {
    proof_id: ProofId,
}

/// Verify the signature over the raw body, then parse it and re-enqueue
/// the proof. Returns the proof id that was enqueued.
pub fn handle_retrigger(
    secret: &str,
    body: &[u8],
    signature: Option<&str>,
    sink: &dyn ProofSink,
) -> Result<ProofId, WebhookError> {
    let signature = signature.ok_or(WebhookError::MissingSignature)?;
    if !verify_webhook_signature(secret.as_bytes(), body, signature) {
        return Err(WebhookError::InvalidSignature);
    }

    let payload: RetriggerPayload = serde_json::from_slice(body)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    sink.enqueue(&payload.proof_id)
        .map_err(WebhookError::Queue)?;

    tracing::info!(proof = %payload.proof_id, "verification re-triggered via webhook");
    Ok(payload.proof_id)
}
