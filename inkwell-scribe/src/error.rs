//! Error types for inkwell-scribe
//!
//! Every handler returns [`ApiResult`]; domain errors convert into [`ApiError`] and
//! render as `{"error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inkwell_common::auth::AuthError;
use serde_json::json;
use thiserror::Error;

use crate::capability::CapabilityError;
use crate::draft::{PipelineError, ValidationError};
use crate::services::{BrowseError, InsightError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Input rejected by validation (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing, unknown or expired session (401)
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. a submission already in flight
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation produced nothing to show (422)
    #[error("{0}")]
    EmptyResult(String),

    /// Provider or store call failed (502)
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// inkwell-common error
    #[error("Common error: {0}")]
    Common(#[from] inkwell_common::Error),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(e) => ApiError::Validation(e),
            PipelineError::SubmissionInFlight | PipelineError::TranscriptionPending => {
                ApiError::Conflict(err.to_string())
            }
            PipelineError::PageNotFound(_) => ApiError::NotFound(err.to_string()),
            PipelineError::Capability(e) => ApiError::Capability(e),
            PipelineError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<BrowseError> for ApiError {
    fn from(err: BrowseError) -> Self {
        match err {
            BrowseError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BrowseError::Capability(e) => ApiError::Capability(e),
        }
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::NoEntries | InsightError::NoInsights => ApiError::EmptyResult(err.to_string()),
            InsightError::Capability(e) => ApiError::Capability(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation(ref err) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string()),
            ApiError::Auth(ref err) => {
                let code = match err {
                    AuthError::NotAuthenticated => "NOT_AUTHENTICATED",
                    AuthError::SessionExpired { .. } => "SESSION_EXPIRED",
                    AuthError::Store(_) => "AUTH_STORE_ERROR",
                };
                let status = match err {
                    AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (status, code, err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::EmptyResult(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_RESULT", msg),
            ApiError::Capability(ref err) => {
                (StatusCode::BAD_GATEWAY, "CAPABILITY_FAILURE", err.to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, message = %message, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
