//! Completion relay client.
//!
//! [`CompletionClient`] is the narrow seam between the chat service and the
//! external model: an ordered role/content history goes in, one reply comes
//! out. [`OpenAiClient`] talks to any OpenAI-compatible
//! `POST {base_url}/chat/completions` endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

const COMPLETIONS_PATH: &str = "/chat/completions";

/// One entry of the history sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// No credential was configured; surfaces on the first call.
    #[error("completion API key is not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// Network failure, TLS failure, or an undecodable body.
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status (rate limit, auth, ...).
    #[error("completion API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The API answered 2xx but without a usable reply.
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Produces the next assistant message for an ordered history.
#[async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    async fn complete(&self, history: &[PromptMessage]) -> Result<String, CompletionError>;
}

/// [`CompletionClient`] backed by an OpenAI-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docchat-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            api_key,
            model: model.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, CompletionError> {
        Self::new(&cfg.openai_base_url, cfg.openai_api_key.clone(), cfg.model.clone())
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, history: &[PromptMessage]) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;

        debug!(endpoint = %self.endpoint, model = %self.model, messages = history.len(), "sending completion request");

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages: history,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let body: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| CompletionError::MalformedResponse("response has no message content".into()))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
