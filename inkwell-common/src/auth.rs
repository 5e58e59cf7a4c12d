//! Owner session resolution
//!
//! The external auth provider hands the client an opaque bearer token. Only the
//! SHA-256 hash of each token is stored, alongside its owner and expiry.
//!
//! A missing or unknown token and an expired one are reported separately so the
//! client can tell "log in" from "log in again".

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::models::OwnerId;
use crate::time;

/// Authentication failure
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token supplied, or the token was never issued
    #[error("No authenticated user")]
    NotAuthenticated,

    /// Token was issued but is past its expiry
    #[error("Session expired at {expired_at}")]
    SessionExpired { expired_at: DateTime<Utc> },

    /// Session lookup failed
    #[error("Session store error: {0}")]
    Store(String),
}

/// SHA-256 of the raw token, lowercase hex
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Issue a new session for `owner` valid for `ttl`, returning the raw token
pub async fn issue_session(
    pool: &SqlitePool,
    owner: &OwnerId,
    ttl: Duration,
) -> Result<String, AuthError> {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    let now = time::now();
    sqlx::query(
        "INSERT INTO sessions (token_hash, owner_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(owner.as_str())
    .bind(time::to_storage(&now))
    .bind(time::to_storage(&(now + ttl)))
    .execute(pool)
    .await
    .map_err(|e| AuthError::Store(e.to_string()))?;

    tracing::info!(owner = %owner, "Session issued");
    Ok(token)
}

/// Resolve the owner behind a bearer token
pub async fn resolve_owner(pool: &SqlitePool, token: &str) -> Result<OwnerId, AuthError> {
    resolve_owner_at(pool, token, time::now()).await
}

/// [`resolve_owner`] evaluated at an explicit instant
pub async fn resolve_owner_at(
    pool: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<OwnerId, AuthError> {
    if token.trim().is_empty() {
        return Err(AuthError::NotAuthenticated);
    }

    let row = sqlx::query("SELECT owner_id, expires_at FROM sessions WHERE token_hash = ?")
        .bind(hash_token(token.trim()))
        .fetch_optional(pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

    let Some(row) = row else {
        return Err(AuthError::NotAuthenticated);
    };

    let expires_at: String = row.get("expires_at");
    let expires_at = time::from_storage(&expires_at).map_err(|e| AuthError::Store(e.to_string()))?;
    if expires_at <= now {
        tracing::debug!(%expires_at, "Rejected expired session");
        return Err(AuthError::SessionExpired { expired_at: expires_at });
    }

    Ok(OwnerId::new(row.get::<String, _>("owner_id")))
}

/// Remove sessions that expired before `now`; returns the number removed
pub async fn purge_expired_sessions(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, AuthError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(time::to_storage(&now))
        .execute(pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;
    Ok(result.rows_affected())
}

/// Whether `owner` holds at least one session still valid at `now`
pub async fn has_active_session(
    pool: &SqlitePool,
    owner: &OwnerId,
    now: DateTime<Utc>,
) -> Result<bool, AuthError> {
    let row = sqlx::query("SELECT 1 FROM sessions WHERE owner_id = ? AND expires_at > ? LIMIT 1")
        .bind(owner.as_str())
        .bind(time::to_storage(&now))
        .fetch_optional(pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;
    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_issued_session_resolves_owner() {
        let pool = init_memory_pool().await.unwrap();
        let owner = OwnerId::new("alice");

        let token = issue_session(&pool, &owner, Duration::hours(1)).await.unwrap();
        assert_eq!(resolve_owner(&pool, &token).await.unwrap(), owner);
    }

    #[tokio::test]
    async fn test_unknown_and_blank_tokens_are_not_authenticated() {
        let pool = init_memory_pool().await.unwrap();

        assert!(matches!(
            resolve_owner(&pool, "deadbeef").await,
            Err(AuthError::NotAuthenticated)
        ));
        assert!(matches!(
            resolve_owner(&pool, "  ").await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_distinguished() {
        let pool = init_memory_pool().await.unwrap();
        let owner = OwnerId::new("alice");
        let token = issue_session(&pool, &owner, Duration::minutes(5)).await.unwrap();

        let later = time::now() + Duration::minutes(10);
        assert!(matches!(
            resolve_owner_at(&pool, &token, later).await,
            Err(AuthError::SessionExpired { .. })
        ));

        assert_eq!(purge_expired_sessions(&pool, later).await.unwrap(), 1);
        assert!(matches!(
            resolve_owner_at(&pool, &token, later).await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_active_session_tracks_expiry() {
        let pool = init_memory_pool().await.unwrap();
        let owner = OwnerId::new("alice");
        assert!(!has_active_session(&pool, &owner, time::now()).await.unwrap());

        issue_session(&pool, &owner, Duration::minutes(5)).await.unwrap();
        assert!(has_active_session(&pool, &owner, time::now()).await.unwrap());
        assert!(!has_active_session(&pool, &owner, time::now() + Duration::minutes(10)).await.unwrap());
        assert!(!has_active_session(&pool, &OwnerId::new("bob"), time::now()).await.unwrap());
    }
}
