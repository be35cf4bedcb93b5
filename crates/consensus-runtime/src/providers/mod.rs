//! Judge client abstractions for consensus-runtime.
//!
//! This module defines the trait for the external semantic judge and the
//! OpenAI-compatible implementation used in production.
//!
//! ## Security
//!
//! Providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub mod secrets;

#[cfg(feature = "openai")]
mod openai;

pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "openai")]
pub use openai::{OpenAiJudge, DEFAULT_BASE_URL, DEFAULT_JUDGE_MODEL, OPENAI_API_KEY_ENV};

/// Default per-call timeout for judge requests.
pub const DEFAULT_JUDGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the judge service.
///
/// These never reach callers of the validation pipeline; the semantic
/// validator absorbs every variant into a `fail` outcome.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Judge returned no response choice")]
    EmptyResponse,

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// A chat message sent to the judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system" or "user"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One constrained classification request.
///
/// Lives for exactly one judge call.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentRequest {
    /// System instruction
    pub system: String,

    /// Rendered user prompt
    pub prompt: String,

    /// Hard cap on the reply length
    pub max_tokens: u32,

    /// Sampling temperature (always 0.0 for judgments)
    pub temperature: f32,
}

impl JudgmentRequest {
    /// The request as an ordered system + user conversation.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.prompt.clone()),
        ]
    }
}

/// Raw reply from the judge.
#[derive(Debug, Clone)]
pub struct JudgeReply {
    /// Text of the first response choice, untrimmed and unvalidated
    pub content: String,

    /// Model that produced the reply
    pub model: String,

    /// Token usage, when reported
    pub usage: TokenUsage,

    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Token usage from a judge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used. Counts come from the judge, so the sum saturates.
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// The external semantic judge.
///
/// Implementations report every transport, auth, or quota fault as an
/// explicit [`ProviderError`]; absorbing them is the caller's job.
/// Instances are shared read-only across concurrent requests.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Submit one judgment request and return the raw reply.
    async fn judge(&self, request: &JudgmentRequest) -> Result<JudgeReply, ProviderError>;

    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Judge model identifier.
    fn model(&self) -> &str;
}
