//! # consensus-runtime
//!
//! LLM-judged semantic validation for Consensus.
//!
//! This crate wraps the deterministic sequence rule from `consensus-core`
//! with a single call to an external semantic judge.
//!
//! ## Guarantees
//!
//! - The judge is never consulted unless the sequence rule passed
//! - Judge faults and unrecognized replies become `fail`, never `pass`
//! - A missing judge credential is reported as [`PipelineError::NotConfigured`],
//!   distinct from a `fail` outcome
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use consensus_core::Submission;
//! use consensus_runtime::{OpenAiJudge, SemanticConfig, SemanticValidator, ValidationPipeline};
//!
//! let judge = OpenAiJudge::from_env()?;
//! let validator = SemanticValidator::new(Arc::new(judge), SemanticConfig::default());
//! let pipeline = ValidationPipeline::new(Some(validator));
//!
//! let submission = Submission::new(["yes", "no"], "A black BMW convertible");
//! let outcome = pipeline.validate(&submission).await?;
//! ```

pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod semantic;

#[cfg(test)]
mod testing;

pub use pipeline::{PipelineError, ValidationPipeline};
pub use prompts::PromptError;
pub use providers::{
    ApiCredential, CredentialSource, JudgeClient, JudgeReply, JudgmentRequest, ProviderError,
    TokenUsage, DEFAULT_JUDGE_TIMEOUT,
};
pub use semantic::{
    normalize_verdict, SemanticConfig, SemanticValidator, DEFAULT_MAX_TOKENS, MAX_REPLY_TOKENS,
};

#[cfg(feature = "openai")]
pub use providers::{OpenAiJudge, DEFAULT_BASE_URL, DEFAULT_JUDGE_MODEL, OPENAI_API_KEY_ENV};
