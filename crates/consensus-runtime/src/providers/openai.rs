//! OpenAI-compatible chat completions judge.
//!
//! Issues one `POST {base_url}/chat/completions` per judgment and returns
//! the raw text of the first choice.
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`] and only exposed when the
//! `Authorization` header is built. See the [`secrets`](super::secrets) module.

use super::{
    secrets::ApiCredential, ChatMessage, JudgeClient, JudgeReply, JudgmentRequest, ProviderError,
    TokenUsage, DEFAULT_JUDGE_TIMEOUT,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable name for the judge API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Judge model used when none is configured.
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4o";

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions judge.
///
/// Holds a pooled `reqwest::Client`; cloning the judge or sharing it behind
/// an `Arc` reuses the same connections.
#[derive(Clone)]
pub struct OpenAiJudge {
    credential: Arc<ApiCredential>,
    model: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiJudge")
            .field("credential", &self.credential)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiJudge {
    /// Create a judge around an already-validated credential.
    pub fn new(credential: ApiCredential) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(Self {
            credential: Arc::new(credential),
            model: DEFAULT_JUDGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_JUDGE_TIMEOUT,
            client,
        })
    }

    /// Create from `OPENAI_API_KEY`.
    ///
    /// Fails with [`ProviderError::NotConfigured`] when the variable is unset
    /// or empty. The value is never logged.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(OPENAI_API_KEY_ENV, "OpenAI API key")?;
        Self::new(credential)
    }

    /// Set the judge model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (trailing slashes are dropped).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Chat completions request format.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> CompletionRequest<'a> {
    fn new(model: &'a str, request: &JudgmentRequest) -> Self {
        Self {
            model,
            messages: request.messages(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Chat completions response format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl CompletionResponse {
    /// Take the first choice's text. A missing choice or null content is an error.
    fn into_reply(self) -> Result<JudgeReply, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;
        let content = choice.message.content.ok_or(ProviderError::EmptyResponse)?;
        let usage = self
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(JudgeReply {
            content,
            model: self.model,
            usage,
            finish_reason: choice.finish_reason,
        })
    }
}

/// Map a non-success status and its body text into a provider error.
fn status_error(status: u16, retry_after: Option<Duration>, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthError,
        429 => ProviderError::RateLimited { retry_after },
        _ => {
            let message = serde_json::from_str::<ApiErrorBody>(body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            ProviderError::ApiError { status, message }
        }
    }
}

#[async_trait]
impl JudgeClient for OpenAiJudge {
    async fn judge(&self, request: &JudgmentRequest) -> Result<JudgeReply, ProviderError> {
        let body = CompletionRequest::new(&self.model, request);

        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.credential.expose())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), retry_after, &text));
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout)
            } else {
                ProviderError::ParseError(e.to_string())
            }
        })?;

        body.into_reply()
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
