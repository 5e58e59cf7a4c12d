//! Insight Engine endpoints

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::AuthenticatedOwner;
use crate::capability::InsightMode;
use crate::services::InsightItem;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct InsightModeInfo {
    pub mode: InsightMode,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub mode: InsightMode,
    pub items: Vec<InsightItem>,
}

/// GET /api/insights
pub async fn list_modes() -> Json<Vec<InsightModeInfo>> {
    Json(
        InsightMode::ALL
            .into_iter()
            .map(|mode| InsightModeInfo {
                mode,
                title: mode.title(),
                description: mode.description(),
            })
            .collect(),
    )
}

/// POST /api/insights/:mode
pub async fn analyze(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    Path(mode): Path<String>,
) -> ApiResult<Json<InsightResponse>> {
    let mode: InsightMode = mode.parse().map_err(ApiError::NotFound)?;
    let engine = state.insight_engine_for(&owner).await;
    let items = engine.analyze(mode).await?;
    Ok(Json(InsightResponse { mode, items }))
}

/// DELETE /api/insights/cache
pub async fn clear_cache(
    State(state): State<AppState>,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> Json<Value> {
    let cleared = state.drop_insight_cache(&owner).await;
    Json(json!({ "cleared": cleared }))
}

/// Build insight routes
pub fn insight_routes() -> Router<AppState> {
    Router::new()
        .route("/api/insights", get(list_modes))
        .route("/api/insights/cache", delete(clear_cache))
        .route("/api/insights/:mode", post(analyze))
}
