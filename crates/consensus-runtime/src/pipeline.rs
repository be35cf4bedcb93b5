//! Two-stage validation pipeline.
//!
//! ```text
//! Start ──sequence fail──▶ Fail
//!   │
//!   └─sequence pass──▶ Semantic Check ──▶ Pass | Fail
//! ```
//!
//! The judge is consulted only after the sequence rule passes. A missing
//! judge is a configuration fault, not a `fail` outcome.

use consensus_core::{Outcome, SequenceRule, Submission};
use thiserror::Error;

use crate::prompts::PromptError;
use crate::semantic::SemanticValidator;

/// Errors from the pipeline.
///
/// Neither variant is a validation result; both mean the service could not
/// perform the validation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Judge service not configured")]
    NotConfigured,

    #[error("Prompt construction failed: {0}")]
    Prompt(#[from] PromptError),
}

/// Runs the sequence gate, then the semantic validator.
///
/// Holds no per-request state; share it behind an `Arc` across requests.
#[derive(Debug)]
pub struct ValidationPipeline {
    rule: SequenceRule,
    semantic: Option<SemanticValidator>,
}

impl ValidationPipeline {
    /// Create a pipeline. `None` means no judge credential was available.
    pub fn new(semantic: Option<SemanticValidator>) -> Self {
        Self {
            rule: SequenceRule::default(),
            semantic,
        }
    }

    /// Replace the sequence rule.
    pub fn with_rule(mut self, rule: SequenceRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn is_judge_configured(&self) -> bool {
        self.semantic.is_some()
    }

    pub fn semantic(&self) -> Option<&SemanticValidator> {
        self.semantic.as_ref()
    }

    /// Validate a submission.
    pub async fn validate(&self, submission: &Submission) -> Result<Outcome, PipelineError> {
        if self.rule.check(submission.sequence_answers.as_slice()) == Outcome::Fail {
            return Ok(Outcome::Fail);
        }

        let semantic = self.semantic.as_ref().ok_or_else(|| {
            tracing::error!("Judge credential not configured; cannot run semantic check");
            PipelineError::NotConfigured
        })?;

        Ok(semantic.validate(&submission.descriptive_answer).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use crate::semantic::SemanticConfig;
    use crate::testing::ScriptedJudge;
    use std::sync::Arc;

    fn pipeline(judge: &Arc<ScriptedJudge>) -> ValidationPipeline {
        ValidationPipeline::new(Some(SemanticValidator::new(
            judge.clone(),
            SemanticConfig::default(),
        )))
    }

    #[tokio::test]
    async fn test_wrong_length_short_circuits() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let pipeline = pipeline(&judge);

        let empty: Vec<String> = Vec::new();
        for answers in [empty, vec!["yes".to_string()], vec!["yes".into(), "no".into(), "no".into()]] {
            let submission = Submission::new(answers, "A black BMW convertible");
            let outcome = pipeline.validate(&submission).await.unwrap();
            assert_eq!(outcome, Outcome::Fail);
        }

        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_sequence_short_circuits() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let pipeline = pipeline(&judge);

        for answers in [["no", "yes"], ["yes", "yes"], ["no", "no"], ["y", "n"]] {
            let submission = Submission::new(answers, "A black BMW convertible");
            assert_eq!(pipeline.validate(&submission).await.unwrap(), Outcome::Fail);
        }

        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_yes_no_with_passing_judge() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let pipeline = pipeline(&judge);

        let submission = Submission::new(["Yes", "No"], "black BMW convertible, orange seats");
        assert_eq!(pipeline.validate(&submission).await.unwrap(), Outcome::Pass);
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn test_yes_no_with_unrecognized_reply() {
        let judge = Arc::new(ScriptedJudge::replying("maybe"));
        let pipeline = pipeline(&judge);

        let submission = Submission::new(["yes", "no"], "a car");
        assert_eq!(pipeline.validate(&submission).await.unwrap(), Outcome::Fail);
    }

    #[tokio::test]
    async fn test_yes_no_with_transport_fault() {
        let judge = Arc::new(ScriptedJudge::failing(|| {
            ProviderError::HttpError("connection refused".to_string())
        }));
        let pipeline = pipeline(&judge);

        let submission = Submission::new(["yes", "no"], "a car");
        assert_eq!(pipeline.validate(&submission).await.unwrap(), Outcome::Fail);
        assert_eq!(judge.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_judge_is_configuration_fault() {
        let pipeline = ValidationPipeline::new(None);
        assert!(!pipeline.is_judge_configured());

        let submission = Submission::new(["yes", "no"], "a car");
        let result = pipeline.validate(&submission).await;
        assert!(matches!(result, Err(PipelineError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_missing_judge_still_fails_bad_sequence() {
        let pipeline = ValidationPipeline::new(None);

        let submission = Submission::new(["no", "yes"], "a car");
        assert_eq!(pipeline.validate(&submission).await.unwrap(), Outcome::Fail);
    }

    #[tokio::test]
    async fn test_prompt_defect_escapes() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let config = SemanticConfig {
            prompt_template: "no placeholders".to_string(),
            ..Default::default()
        };
        let pipeline = ValidationPipeline::new(Some(SemanticValidator::new(judge.clone(), config)));

        let submission = Submission::new(["yes", "no"], "a car");
        let result = pipeline.validate(&submission).await;
        assert!(matches!(result, Err(PipelineError::Prompt(_))));
        assert_eq!(judge.calls(), 0);
    }

    #[tokio::test]
    async fn test_idempotent_with_deterministic_judge() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let pipeline = pipeline(&judge);
        let submission = Submission::new(["yes", "no"], "black BMW");

        let first = pipeline.validate(&submission).await.unwrap();
        let second = pipeline.validate(&submission).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(judge.requests()[0], judge.requests()[1]);
    }

    #[tokio::test]
    async fn test_custom_rule() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let pipeline = pipeline(&judge).with_rule(SequenceRule::new("no", "yes"));

        let submission = Submission::new(["No", "Yes"], "a car");
        assert_eq!(pipeline.validate(&submission).await.unwrap(), Outcome::Pass);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_share_judge() {
        let judge = Arc::new(ScriptedJudge::replying("pass"));
        let pipeline = Arc::new(pipeline(&judge));

        let tasks = (0..16).map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                let submission = Submission::new(["yes", "no"], format!("answer {}", i));
                pipeline.validate(&submission).await
            })
        });

        let results = futures::future::join_all(tasks).await;
        for result in results {
            assert_eq!(result.unwrap().unwrap(), Outcome::Pass);
        }
        assert_eq!(judge.calls(), 16);
    }
}
