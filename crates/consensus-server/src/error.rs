//! HTTP error mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use consensus_runtime::PipelineError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the HTTP boundary.
///
/// None of these is a validation result. A `fail` outcome is always a 200.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body could not be decoded into a submission.
    #[error("invalid payload: {message}")]
    InvalidPayload { status: StatusCode, message: String },

    /// No judge credential was configured.
    #[error("judge service not configured")]
    NotConfigured,

    /// Anything else. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    /// - InvalidPayload: the decoder's status (400, 415 or 422)
    /// - NotConfigured: 503 Service Unavailable
    /// - Internal: 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload { status, .. } => *status,
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NotConfigured => Self::NotConfigured,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Self::InvalidPayload { message, .. } => {
                tracing::debug!(status = %status, detail = %message, "Rejected payload");
                message.as_str()
            }
            Self::NotConfigured => "Judge service not configured",
            Self::Internal(cause) => {
                tracing::error!(error = %cause, "Error validating answers");
                "Internal server error"
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
