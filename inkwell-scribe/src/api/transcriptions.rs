//! Ingestion endpoint for raw transcription records

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::AuthenticatedOwner;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTranscriptionRequest {
    pub content: String,
    #[serde(default, alias = "originalFiles")]
    pub original_files: Vec<String>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// POST /api/transcriptions
///
/// Answers `{"id": ...}`, or a generic 500 on any store failure.
pub async fn create_transcription(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(request): Json<CreateTranscriptionRequest>,
) -> Response {
    let created_at = request.created_at.unwrap_or_else(Utc::now);
    let result = state
        .capabilities
        .store
        .create_raw_transcription(&owner, &request.content, &request.original_files, created_at)
        .await;

    match result {
        Ok(id) => {
            tracing::info!(owner = %owner, id = %id, "Raw transcription saved");
            Json(json!({ "id": id })).into_response()
        }
        Err(e) => {
            tracing::error!(owner = %owner, error = %e, "Failed to save transcription");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to save transcription" })),
            )
                .into_response()
        }
    }
}

/// Build ingestion routes
pub fn transcription_routes() -> Router<AppState> {
    Router::new().route("/api/transcriptions", post(create_transcription))
}
