//! Multimodal analysis collaborator.

use crate::error::PipelineError;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sidequest_media::Frame;
use sidequest_types::AiDecision;
use std::sync::Mutex;

/// System prompt for the verification model. The model must answer with the
/// structured JSON that deserializes into [`AnalysisVerdict`].
const VERIFICATION_PROMPT: &str = "You are a quest verification AI. Analyze the video frames and \
audio transcript to determine if the quest was completed.\n\n\
Respond with structured JSON:\n\
{\n\
  \"confidence\": <0-100>,\n\
  \"decision\": \"APPROVE\" | \"REJECT\" | \"UNCERTAIN\",\n\
  \"reasoning\": \"<2-3 sentences>\",\n\
  \"detected_actions\": [\"<action1>\", \"<action2>\"],\n\
  \"matches_description\": <true/false>,\n\
  \"safety_flags\": [\"<flag1>\"]\n\
}\n\n\
Be strict but fair. Only APPROVE if clearly completed. Flag any unsafe \
content (violence, nudity, self-harm, etc). Empty safety_flags array if none.";

/// Everything the analyzer sees about one proof.
#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    pub description: String,
    pub transcript: String,
    pub frames: Vec<Frame>,
}

/// The analyzer's structured verdict.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub confidence: u8,
    pub decision: AiDecision,
    pub reasoning: String,
    #[serde(default)]
    pub detected_actions: Vec<String>,
    #[serde(default)]
    pub matches_description: bool,
    #[serde(default)]
    pub safety_flags: Vec<String>,
}

impl AnalysisVerdict {
    /// The canned verdict substituted when analysis fails: escalate instead
    /// of propagating.
    pub fn escalation_fallback() -> Self {
        Self {
            confidence: 50,
            decision: AiDecision::Uncertain,
            reasoning: "analysis failed, escalated".to_string(),
            detected_actions: Vec::new(),
            matches_description: false,
            safety_flags: Vec::new(),
        }
    }

    /// Whether any safety flag was raised.
    pub fn safety_flagged(&self) -> bool {
        !self.safety_flags.is_empty()
    }
}

/// Judges quest completion from description, transcript, and frames.
pub trait Analyzer: Send + Sync {
    fn analyze<'a>(
        &'a self,
        request: AnalysisRequest,
    ) -> BoxFuture<'a, Result<AnalysisVerdict, PipelineError>>;
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint with
/// vision input and JSON response formatting.
pub struct HttpAnalyzer {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl HttpAnalyzer {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn analyze_inner(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisVerdict, PipelineError> {
        let mut content = vec![serde_json::json!({
            "type": "text",
            "text": format!(
                "Quest description: {}\n\nAudio transcript: {}\n\nAnalyze the following {} video frames:",
                request.description,
                if request.transcript.is_empty() { "(no audio detected)" } else { &request.transcript },
                request.frames.len(),
            ),
        })];
        use base64::{engine::general_purpose::STANDARD, Engine};
        for frame in &request.frames {
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", frame.mime_type, STANDARD.encode(&frame.bytes)),
                },
            }));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": VERIFICATION_PROMPT },
                { "role": "user", "content": content },
            ],
            "response_format": { "type": "json_object" },
            "max_tokens": 1000,
        });

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::External(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PipelineError::External(format!(
                "analysis API returned {}",
                resp.status()
            )));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::External(e.to_string()))?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| PipelineError::External("empty completion".into()))?;

        serde_json::from_str(content)
            .map_err(|e| PipelineError::External(format!("unparseable verdict: {e}")))
    }
}

impl Analyzer for HttpAnalyzer {
    fn analyze<'a>(
        &'a self,
        request: AnalysisRequest,
    ) -> BoxFuture<'a, Result<AnalysisVerdict, PipelineError>> {
        Box::pin(self.analyze_inner(request))
    }
}

/// Scripted analyzer for tests: a fixed verdict or a failure, and it
/// remembers the last request it saw.
pub struct NullAnalyzer {
    result: Mutex<Result<AnalysisVerdict, String>>,
    last_request: Mutex<Option<AnalysisRequest>>,
}

impl NullAnalyzer {
    pub fn returning(verdict: AnalysisVerdict) -> Self {
        Self {
            result: Mutex::new(Ok(verdict)),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Mutex::new(Err(message.to_string())),
            last_request: Mutex::new(None),
        }
    }

    /// A verdict with the given confidence, no safety flags.
    pub fn with_confidence(confidence: u8) -> Self {
        Self::returning(AnalysisVerdict {
            confidence,
            decision: AiDecision::Uncertain,
            reasoning: "scripted".into(),
            detected_actions: Vec::new(),
            matches_description: true,
            safety_flags: Vec::new(),
        })
    }

    pub fn last_request(&self) -> Option<AnalysisRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Analyzer for NullAnalyzer {
    fn analyze<'a>(
        &'a self,
        request: AnalysisRequest,
    ) -> BoxFuture<'a, Result<AnalysisVerdict, PipelineError>> {
        *self.last_request.lock().unwrap() = Some(request);
        let result = self.result.lock().unwrap().clone();
        Box::pin(async move { result.map_err(PipelineError::External) })
    }
}
