//! Bearer-token extractor resolving the calling owner

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use inkwell_common::auth::{self, AuthError};
use inkwell_common::OwnerId;

use crate::{ApiError, AppState};

/// Owner behind the request's session token
///
/// Missing or unknown tokens reject with `NOT_AUTHENTICATED`, expired ones with
/// `SESSION_EXPIRED`.
#[derive(Debug, Clone)]
pub struct AuthenticatedOwner(pub OwnerId);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedOwner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::NotAuthenticated)?;
        let owner = auth::resolve_owner(&state.db, token).await.map_err(|e| {
            tracing::debug!(error = %e, "Rejecting request");
            e
        })?;
        Ok(Self(owner))
    }
}
