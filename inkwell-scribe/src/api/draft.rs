//! Draft endpoints: pages, cursor, title and submission of the caller's draft

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::Engine;
use inkwell_common::JournalEntry;
use serde::Deserialize;

use super::AuthenticatedOwner;
use crate::draft::{CursorMove, DraftSnapshot, UploadedImage};
use crate::{ApiError, ApiResult, AppState};

/// One image in an upload request
#[derive(Debug, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct AppendPagesRequest {
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Deserialize)]
pub struct SetTitleRequest {
    pub title: String,
}

impl TryFrom<ImageUpload> for UploadedImage {
    type Error = ApiError;

    fn try_from(upload: ImageUpload) -> Result<Self, Self::Error> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(upload.data_base64.trim())
            .map_err(|e| ApiError::BadRequest(format!("{}: invalid base64 data: {}", upload.file_name, e)))?;
        Ok(UploadedImage {
            file_name: upload.file_name,
            content_type: upload.content_type,
            bytes,
        })
    }
}

/// GET /api/draft
pub async fn get_draft(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> Json<DraftSnapshot> {
    Json(state.pipeline_for(&owner).await.snapshot().await)
}

/// POST /api/draft/pages
///
/// Pages are staged immediately; transcription continues after the response.
pub async fn append_pages(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(request): Json<AppendPagesRequest>,
) -> ApiResult<(StatusCode, Json<DraftSnapshot>)> {
    let uploads = request
        .images
        .into_iter()
        .map(UploadedImage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let pipeline = state.pipeline_for(&owner).await;
    pipeline.append_detached(uploads).await?;
    Ok((StatusCode::ACCEPTED, Json(pipeline.snapshot().await)))
}

/// DELETE /api/draft/pages/:index
pub async fn delete_page(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(index): Path<usize>,
) -> ApiResult<Json<DraftSnapshot>> {
    let pipeline = state.pipeline_for(&owner).await;
    pipeline.delete_page(index).await?;
    Ok(Json(pipeline.snapshot().await))
}

/// PUT /api/draft/cursor, body `{"to": n}` or `{"by": d}`
pub async fn move_cursor(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(movement): Json<CursorMove>,
) -> Json<DraftSnapshot> {
    let pipeline = state.pipeline_for(&owner).await;
    pipeline.move_cursor(movement).await;
    Json(pipeline.snapshot().await)
}

/// PUT /api/draft/title
pub async fn set_title(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Json(request): Json<SetTitleRequest>,
) -> ApiResult<Json<DraftSnapshot>> {
    let pipeline = state.pipeline_for(&owner).await;
    pipeline.set_title(request.title).await?;
    Ok(Json(pipeline.snapshot().await))
}

/// POST /api/draft/submit
pub async fn submit_draft(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
    let entry = state.pipeline_for(&owner).await.submit().await?;

    // Cached analyses no longer cover every entry
    state.drop_insight_cache(&owner).await;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /api/draft/acknowledge
pub async fn acknowledge_failure(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> Json<DraftSnapshot> {
    let pipeline = state.pipeline_for(&owner).await;
    if !pipeline.acknowledge_failure().await {
        tracing::debug!(owner = %owner, "No failed submission to acknowledge");
    }
    Json(pipeline.snapshot().await)
}

/// Build draft routes
pub fn draft_routes() -> Router<AppState> {
    Router::new()
        .route("/api/draft", get(get_draft))
        .route("/api/draft/pages", post(append_pages))
        .route("/api/draft/pages/:index", delete(delete_page))
        .route("/api/draft/cursor", put(move_cursor))
        .route("/api/draft/title", put(set_title))
        .route("/api/draft/submit", post(submit_draft))
        .route("/api/draft/acknowledge", post(acknowledge_failure))
}
