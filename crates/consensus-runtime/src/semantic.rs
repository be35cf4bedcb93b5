//! Semantic validation through the external judge.
//!
//! # Safe Default
//! The judge assists; it never gets the benefit of the doubt. Any reply
//! that is not exactly `pass` or `fail` after normalization, and any judge
//! fault, yields [`Outcome::Fail`].

use std::sync::Arc;

use consensus_core::{ExpectedReference, Outcome};
use serde::{Deserialize, Serialize};

use crate::prompts::{render_judgment, PromptError, JUDGMENT_TEMPLATE, SYSTEM_PROMPT};
use crate::providers::{JudgeClient, JudgmentRequest};

/// Reply length cap: enough for a single word.
pub const DEFAULT_MAX_TOKENS: u32 = 10;

/// Largest reply cap a configuration may set.
pub const MAX_REPLY_TOKENS: u32 = 16;

/// Judgments always use greedy decoding.
pub const JUDGE_TEMPERATURE: f32 = 0.0;

/// Configuration for semantic validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SemanticConfig {
    /// Ground truth the answer is compared against
    pub expected_reference: ExpectedReference,

    /// Template with `{expected_answer}` and `{user_answer}` placeholders
    pub prompt_template: String,

    /// System instruction sent ahead of the prompt
    pub system_prompt: String,

    /// Maximum reply tokens
    pub max_tokens: u32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            expected_reference: ExpectedReference::default(),
            prompt_template: JUDGMENT_TEMPLATE.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl SemanticConfig {
    /// Create a config with the specified reference and default prompts.
    pub fn new(expected_reference: impl Into<String>) -> Self {
        Self {
            expected_reference: ExpectedReference::new(expected_reference),
            ..Default::default()
        }
    }
}

/// Parse a raw judge reply: trim, lower-case, then exact match.
pub fn parse_verdict(raw: &str) -> Option<Outcome> {
    Outcome::from_token(&raw.trim().to_lowercase())
}

/// Normalize a raw judge reply into an outcome.
///
/// Anything [`parse_verdict`] does not recognize is `Fail`.
pub fn normalize_verdict(raw: &str) -> Outcome {
    parse_verdict(raw).unwrap_or(Outcome::Fail)
}

/// Decides whether a descriptive answer matches the expected reference.
pub struct SemanticValidator {
    judge: Arc<dyn JudgeClient>,
    config: SemanticConfig,
}

impl std::fmt::Debug for SemanticValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticValidator")
            .field("judge", &self.judge.name())
            .field("model", &self.judge.model())
            .field("config", &self.config)
            .finish()
    }
}

impl SemanticValidator {
    pub fn new(judge: Arc<dyn JudgeClient>, config: SemanticConfig) -> Self {
        Self { judge, config }
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.config
    }

    pub fn judge(&self) -> &dyn JudgeClient {
        self.judge.as_ref()
    }

    /// Build the judgment request for an answer.
    pub fn judgment_request(&self, answer: &str) -> Result<JudgmentRequest, PromptError> {
        let prompt = render_judgment(
            &self.config.prompt_template,
            self.config.expected_reference.as_str(),
            answer,
        )?;

        Ok(JudgmentRequest {
            system: self.config.system_prompt.clone(),
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: JUDGE_TEMPERATURE,
        })
    }

    /// Judge an answer.
    ///
    /// Only prompt-construction defects surface as errors. Every judge-side
    /// fault is logged and absorbed into [`Outcome::Fail`].
    pub async fn validate(&self, answer: &str) -> Result<Outcome, PromptError> {
        let request = self.judgment_request(answer)?;

        let reply = match self.judge.judge(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    judge = self.judge.name(),
                    model = self.judge.model(),
                    error = %e,
                    "Judge call failed, defaulting to fail"
                );
                return Ok(Outcome::Fail);
            }
        };

        match parse_verdict(&reply.content) {
            Some(outcome) => {
                tracing::info!(
                    judge = self.judge.name(),
                    model = %reply.model,
                    outcome = %outcome,
                    answer_len = answer.len(),
                    tokens = reply.usage.total(),
                    "Judge verdict"
                );
                Ok(outcome)
            }
            None => {
                tracing::warn!(
                    judge = self.judge.name(),
                    reply = %reply.content.trim(),
                    "Unexpected judge response, defaulting to fail"
                );
                Ok(Outcome::Fail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderError, TokenUsage};
    use crate::testing::ScriptedJudge;

    fn validator(judge: &Arc<ScriptedJudge>) -> SemanticValidator {
        SemanticValidator::new(judge.clone(), SemanticConfig::default())
    }

    #[test]
    fn test_normalize_verdict() {
        assert_eq!(normalize_verdict("pass"), Outcome::Pass);
        assert_eq!(normalize_verdict("  PASS\n"), Outcome::Pass);
        assert_eq!(normalize_verdict("Fail"), Outcome::Fail);
        assert_eq!(normalize_verdict("maybe"), Outcome::Fail);
        assert_eq!(normalize_verdict(""), Outcome::Fail);
        assert_eq!(normalize_verdict("pass."), Outcome::Fail);
        assert_eq!(normalize_verdict("pass fail"), Outcome::Fail);
        assert_eq!(parse_verdict("\tFAIL "), Some(Outcome::Fail));
        assert_eq!(parse_verdict("passed"), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = SemanticConfig::default();
        assert_eq!(config.max_tokens, 10);
        assert_eq!(config.system_prompt, SYSTEM_PROMPT);
        assert_eq!(config.expected_reference, ExpectedReference::default());
    }

    #[test]
    fn test_judgment_request_parameters() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let config = SemanticConfig::new("A red bike");
        let validator = SemanticValidator::new(judge, config);

        let request = validator.judgment_request("a bicycle").unwrap();
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(request.system, SYSTEM_PROMPT);
        assert!(request.prompt.contains("A red bike"));
        assert!(request.prompt.contains("a bicycle"));
    }

    #[tokio::test]
    async fn test_pass_reply_passes() {
        let judge = Arc::new(ScriptedJudge::replying(" Pass \n"));
        let outcome = validator(&judge).validate("black bmw").await.unwrap();

        assert_eq!(outcome, Outcome::Pass);
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn test_fail_reply_fails() {
        let judge = Arc::new(ScriptedJudge::replying("fail"));
        let outcome = validator(&judge).validate("a blue bicycle").await.unwrap();
        assert_eq!(outcome, Outcome::Fail);
    }

    #[tokio::test]
    async fn test_unrecognized_reply_fails() {
        let judge = Arc::new(ScriptedJudge::replying("maybe"));
        let outcome = validator(&judge).validate("black bmw").await.unwrap();
        assert_eq!(outcome, Outcome::Fail);
    }

    #[tokio::test]
    async fn test_judge_fault_is_absorbed() {
        let judge = Arc::new(ScriptedJudge::failing(|| {
            ProviderError::HttpError("connection reset".to_string())
        }));
        let outcome = validator(&judge).validate("black bmw").await.unwrap();

        assert_eq!(outcome, Outcome::Fail);
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn test_every_fault_kind_is_absorbed() {
        let faults: [fn() -> ProviderError; 5] = [
            || ProviderError::AuthError,
            || ProviderError::RateLimited { retry_after: None },
            || ProviderError::Timeout(std::time::Duration::from_secs(30)),
            || ProviderError::EmptyResponse,
            || ProviderError::ParseError("bad json".to_string()),
        ];

        for fault in faults {
            let judge = Arc::new(ScriptedJudge::failing(fault));
            let outcome = validator(&judge).validate("black bmw").await.unwrap();
            assert_eq!(outcome, Outcome::Fail);
        }
    }

    #[tokio::test]
    async fn test_prompt_defect_is_not_absorbed() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let config = SemanticConfig {
            prompt_template: "Expected: {expected_answer}".to_string(),
            ..Default::default()
        };
        let validator = SemanticValidator::new(judge.clone(), config);

        let result = validator.validate("black bmw").await;
        assert!(matches!(result, Err(PromptError::MissingPlaceholder(_))));
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_prompt_sent_to_judge() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        validator(&judge).validate("a dark BMW cabrio").await.unwrap();

        let requests = judge.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .prompt
            .contains("A black BMW car convertible with orange seat covers"));
        assert!(requests[0].prompt.contains("a dark BMW cabrio"));
    }

    #[tokio::test]
    async fn test_oversized_token_counts_still_yield_verdict() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let judge = Arc::new(ScriptedJudge::replying_with_usage(
            "pass",
            TokenUsage {
                prompt_tokens: u32::MAX,
                completion_tokens: 1,
            },
        ));
        let outcome = validator(&judge).validate("black bmw").await.unwrap();
        assert_eq!(outcome, Outcome::Pass);
    }

    #[test]
    fn test_unknown_config_keys_rejected() {
        let result = serde_json::from_value::<SemanticConfig>(serde_json::json!({
            "expected_refrence": "A red bicycle"
        }));
        assert!(result.is_err());
    }
}
