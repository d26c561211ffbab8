//! Speech-to-text collaborator.

use crate::error::PipelineError;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use std::sync::Mutex;

/// Produces an audio transcript from a video blob.
pub trait Transcriber: Send + Sync {
    fn transcribe<'a>(&'a self, video: Vec<u8>) -> BoxFuture<'a, Result<String, PipelineError>>;
}

/// HTTP client for a Whisper-style transcription endpoint.
///
/// Uploads the video as a multipart form and reads back `{ "text": ... }`.
pub struct HttpTranscriber {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

impl HttpTranscriber {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn transcribe_inner(&self, video: Vec<u8>) -> Result<String, PipelineError> {
        let part = reqwest::multipart::Part::bytes(video)
            .file_name("video.mp4")
            .mime_str("video/mp4")
            .map_err(|e| PipelineError::External(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", "en");

        let resp = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.endpoint))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::External(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PipelineError::External(format!(
                "transcription API returned {}",
                resp.status()
            )));
        }

        let parsed: TranscriptionResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::External(e.to_string()))?;
        Ok(parsed.text.unwrap_or_default())
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe<'a>(&'a self, video: Vec<u8>) -> BoxFuture<'a, Result<String, PipelineError>> {
        Box::pin(self.transcribe_inner(video))
    }
}

/// Scripted transcriber for tests: returns a fixed transcript or fails.
pub struct NullTranscriber {
    result: Mutex<Result<String, String>>,
}

impl NullTranscriber {
    pub fn returning(transcript: &str) -> Self {
        Self {
            result: Mutex::new(Ok(transcript.to_string())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Mutex::new(Err(message.to_string())),
        }
    }
}

impl Transcriber for NullTranscriber {
    fn transcribe<'a>(&'a self, _video: Vec<u8>) -> BoxFuture<'a, Result<String, PipelineError>> {
        let result = self.result.lock().unwrap().clone();
        Box::pin(async move { result.map_err(PipelineError::External) })
    }
}
