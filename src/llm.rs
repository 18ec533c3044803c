//! Completion service client.
//!
//! One non-streaming request per turn against an OpenAI-compatible
//! `chat/completions` endpoint. Every fault (network, status, malformed
//! body) is logged and collapses to "no reply"; callers never see a
//! completion error.

mod error;

pub use error::{CompletionError, CompletionErrorKind};

use crate::config::CompletionConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Interface the dispatcher talks to; tests swap in a scripted client.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Request one reply for the transcript. `None` means "no reply this
    /// turn" and covers every fault path. The silence sentinel, when the
    /// model emits it, comes back verbatim as content.
    async fn complete(&self, transcript: &[ChatMessage]) -> Option<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Production client over HTTP.
pub struct HttpCompletionClient {
    client: Client,
    config: CompletionConfig,
    endpoint: String,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Self {
        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
            endpoint,
        }
    }

    async fn request(&self, transcript: &[ChatMessage]) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: transcript,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::network(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    CompletionError::network(format!("connection failed: {e}"))
                } else {
                    CompletionError::network(format!("request failed: {e}"))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::network(format!("failed to read response: {e}")))?;

        parse_reply(status, &body)
    }
}

/// Interpret an HTTP response from the completion endpoint.
fn parse_reply(status: u16, body: &str) -> Result<String, CompletionError> {
    if !(200..300).contains(&status) {
        return Err(CompletionError::api(status, body));
    }

    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::malformed(format!("unparseable response: {e} - body: {body}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| CompletionError::malformed("response carried no reply content"))
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    async fn complete(&self, transcript: &[ChatMessage]) -> Option<String> {
        let start = Instant::now();
        match self.request(transcript).await {
            Ok(reply) => {
                tracing::info!(
                    model = %self.config.model,
                    duration_ms = %start.elapsed().as_millis(),
                    transcript_len = transcript.len(),
                    reply_chars = reply.len(),
                    "completion returned"
                );
                Some(reply)
            }
            Err(e) => {
                tracing::error!(
                    model = %self.config.model,
                    duration_ms = %start.elapsed().as_millis(),
                    kind = ?e.kind,
                    error = %e,
                    "completion request failed"
                );
                None
            }
        }
    }
}
