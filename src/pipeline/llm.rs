//! Generation call: send the prompt to a chat-completion endpoint and return
//! the reply text.
//!
//! This module is intentionally thin. All wording lives in
//! [`crate::prompts`] and all reply repair lives in
//! [`crate::pipeline::sanitize`]; here we only speak the wire protocol.
//!
//! ## Reply content shape
//!
//! OpenAI-compatible gateways return `choices[0].message.content` either as a
//! plain string or as a list of typed fragments (`{"type": "text", "text":
//! …}` mixed with annotations). [`MessageContent`] models both and
//! [`MessageContent::into_text`] is the single place that flattens them.
//!
//! ## No retries
//!
//! Exactly one request is made per prompt. If the caller drops the future
//! (client disconnected, timeout upstream of us) the request is abandoned
//! with it.

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::prompts::{GenerationPrompt, DEFAULT_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Untyped completion text as returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelReply(String);

impl RawModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RawModelReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can turn a prompt into reply text.
///
/// [`GenerationClient`] is the real implementation; tests and host
/// applications with their own model gateway can supply another.
pub trait ReplyGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &GenerationPrompt,
    ) -> impl Future<Output = Result<RawModelReply, QuizError>> + Send;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Completion content: a flat string or a sequence of typed fragments.
///
/// Fragments stay untyped so that an unexpected shape (a bare string, an
/// annotation whose `text` is an object) is skipped instead of failing the
/// whole body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Fragments(Vec<serde_json::Value>),
}

impl MessageContent {
    /// Flatten into one string, keeping fragments whose `text` is a string.
    pub fn into_text(self) -> String {
        match self {
            MessageContent::Text(s) => s,
            MessageContent::Fragments(fragments) => fragments
                .iter()
                .filter_map(|f| f.get("text").and_then(serde_json::Value::as_str))
                .collect(),
        }
    }
}

impl ChatResponse {
    /// Text of the first choice, or `UpstreamResponse` if there is none.
    pub fn into_reply(self) -> Result<RawModelReply, QuizError> {
        let first = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| QuizError::UpstreamResponse {
                detail: "response has no choices".into(),
            })?;
        let content = first
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| QuizError::UpstreamResponse {
                detail: "first choice has no message content".into(),
            })?;
        Ok(RawModelReply(content.into_text()))
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    system_prompt: String,
    referer: Option<String>,
    app_title: Option<String>,
}

impl fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GenerationClient {
    /// Build a client from config. Fails if no API key is configured.
    pub fn new(config: &QuizConfig) -> Result<Self, QuizError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| QuizError::ProviderNotConfigured {
                hint: "Set OPENROUTER_API_KEY or pass --api-key.".into(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| QuizError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            referer: config.referer.clone(),
            app_title: config.app_title.clone(),
        })
    }

    /// Request body for `prompt`: system persona first, then the prompt.
    pub fn build_request<'a>(&'a self, prompt: &'a GenerationPrompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.as_str(),
                },
            ],
            temperature: self.temperature,
        }
    }

    async fn send(&self, prompt: &GenerationPrompt) -> Result<RawModelReply, QuizError> {
        let start = Instant::now();
        let mut request = self
            .http
            .post(self.endpoint.as_str())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.build_request(prompt));
        if let Some(ref referer) = self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.app_title {
            request = request.header("X-Title", title);
        }

        let response = request
            .send()
            .await
            .map_err(|e| QuizError::UpstreamUnavailable {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QuizError::UpstreamUnavailable {
                endpoint: self.endpoint.clone(),
                reason: format!("reading body: {e}"),
            })?;
        debug!(
            "Generation service replied HTTP {} in {:?}: {}",
            status,
            start.elapsed(),
            body
        );

        let parsed: ChatResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Err(QuizError::UpstreamResponse {
                    detail: format!("HTTP {status}: undecodable body ({e})"),
                })
            }
        };

        if !status.is_success() && parsed.choices.is_empty() {
            warn!("Generation service error HTTP {}: {}", status, body);
            return Err(QuizError::UpstreamResponse {
                detail: format!("HTTP {status}: {}", upstream_error_message(&body)),
            });
        }

        parsed.into_reply()
    }
}

impl ReplyGenerator for GenerationClient {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<RawModelReply, QuizError> {
        self.send(prompt).await
    }
}

/// Pull `error.message` out of an OpenAI-style error body, if present.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "no completion in response".to_string())
}
