//! Owner session issue endpoint
//!
//! Stands in for the hand-off from the external auth provider: the client names an
//! owner and receives a bearer token plus the configured redirect URL.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use inkwell_common::{auth, OwnerId};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub owner_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub token: String,
    pub owner_id: OwnerId,
    pub expires_in_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let owner_id = request.owner_id.trim();
    if owner_id.is_empty() {
        return Err(ApiError::BadRequest("owner_id must not be empty".to_string()));
    }

    let owner = OwnerId::new(owner_id);
    let ttl = chrono::Duration::hours(state.config.auth.session_ttl_hours);
    let token = auth::issue_session(&state.db, &owner, ttl).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            token,
            owner_id: owner,
            expires_in_seconds: ttl.num_seconds(),
            redirect_url: state.config.auth.redirect_url.clone(),
        }),
    ))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/api/sessions", post(create_session))
}
