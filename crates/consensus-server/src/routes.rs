//! HTTP routes.
//!
//! - `POST /validate-answers` - run the validation pipeline
//! - `GET /health` - liveness plus whether a judge is configured

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use consensus_core::{Submission, ValidationResponse};
use consensus_runtime::ValidationPipeline;
use serde::Serialize;

use crate::error::ApiError;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ValidationPipeline>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    judge_configured: bool,
}

/// Build the service router.
pub fn router(pipeline: Arc<ValidationPipeline>) -> Router {
    Router::new()
        .route("/validate-answers", post(validate_answers))
        .route("/health", get(health))
        .with_state(AppState { pipeline })
}

async fn validate_answers(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let Json(submission) = payload?;

    let outcome = state.pipeline.validate(&submission).await?;
    tracing::info!(
        outcome = %outcome,
        answers = submission.sequence_answers.len(),
        "Validated submission"
    );

    Ok(Json(outcome.into()))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        judge_configured: state.pipeline.is_judge_configured(),
    })
}
