//! # consensus-server
//!
//! HTTP boundary for Consensus answer validation.
//!
//! Decodes submissions, runs the [`ValidationPipeline`], and maps faults to
//! status codes. A `fail` outcome is a normal 200 response; a missing judge
//! credential is a 503.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use consensus_runtime::{
    ApiCredential, JudgeClient, OpenAiJudge, ProviderError, SemanticValidator, ValidationPipeline,
    OPENAI_API_KEY_ENV,
};

pub use config::{Cli, ConfigError, ServiceConfig};
pub use error::ApiError;
pub use routes::router;

/// Build the pipeline for a resolved configuration.
///
/// Without a credential the pipeline has no semantic validator, and requests
/// that pass the sequence rule get a configuration error.
pub fn build_pipeline(
    config: &ServiceConfig,
    credential: Option<ApiCredential>,
) -> Result<ValidationPipeline, ProviderError> {
    let Some(credential) = credential else {
        tracing::warn!(
            env = OPENAI_API_KEY_ENV,
            "Judge credential not found; semantic validation disabled"
        );
        return Ok(ValidationPipeline::new(None));
    };

    let judge = OpenAiJudge::new(credential)?
        .with_model(config.judge.model.clone())
        .with_base_url(config.judge.base_url.clone())
        .with_timeout(config.judge.timeout);

    tracing::info!(
        judge = judge.name(),
        model = judge.model(),
        base_url = judge.base_url(),
        timeout = ?judge.timeout(),
        "Judge client initialized"
    );

    let validator = SemanticValidator::new(Arc::new(judge), config.semantic.clone());
    Ok(ValidationPipeline::new(Some(validator)))
}
