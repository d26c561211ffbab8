//! Verification pipeline — judges submitted proofs asynchronously.
//!
//! One job per proof walks `pending → transcribing → analyzing → deciding →
//! complete/failed`; jobs run concurrently across proofs. Collaborator
//! outages never fail a job: transcription degrades to an empty transcript
//! and analysis degrades to an escalation verdict.

pub mod error;
pub mod queue;
pub mod stt;
pub mod vision;
pub mod worker;

pub use error::PipelineError;
pub use queue::{QueueConsumer, VerificationQueue};
pub use stt::{HttpTranscriber, NullTranscriber, Transcriber};
pub use vision::{AnalysisRequest, AnalysisVerdict, Analyzer, HttpAnalyzer, NullAnalyzer};
pub use worker::VerificationWorker;
