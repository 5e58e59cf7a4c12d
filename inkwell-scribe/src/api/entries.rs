//! Entry Browser endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use inkwell_common::JournalEntry;
use serde::Serialize;
use uuid::Uuid;

use super::AuthenticatedOwner;
use crate::services::{EntryBrowser, EntryPreview};
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryPreview>,
    /// Newest entry, shown by default
    pub selected: Option<JournalEntry>,
}

/// GET /api/entries
pub async fn list_entries(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> ApiResult<Json<EntryListResponse>> {
    let browser = EntryBrowser::load(state.capabilities.store.as_ref(), &owner).await?;
    Ok(Json(EntryListResponse {
        entries: browser.previews(),
        selected: browser.selected().cloned(),
    }))
}

/// GET /api/entries/:id
pub async fn get_entry(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntry>> {
    let mut browser = EntryBrowser::load(state.capabilities.store.as_ref(), &owner).await?;
    let entry = browser.select(id)?.clone();
    Ok(Json(entry))
}

/// Build entry routes
pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/api/entries", get(list_entries))
        .route("/api/entries/:id", get(get_entry))
}
