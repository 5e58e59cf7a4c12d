//! inkwell-scribe library interface
//!
//! Handwritten journal service: page uploads are transcribed, titled and stored as
//! journal entries, which can later be browsed and analyzed.

pub mod api;
pub mod capability;
pub mod draft;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use inkwell_common::config::InkwellConfig;
use inkwell_common::{auth, OwnerId};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::capability::Capabilities;
use crate::draft::SubmissionPipeline;
use crate::services::InsightEngine;

/// Upload bodies carry base64 images
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Period of the background [`AppState::housekeeping`] sweep
pub const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// What one housekeeping sweep removed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Housekeeping {
    pub sessions_purged: u64,
    pub drafts_evicted: usize,
    pub insight_engines_evicted: usize,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (entries, transcriptions, sessions)
    pub db: SqlitePool,
    /// Provider and store collaborators
    pub capabilities: Capabilities,
    pub config: Arc<InkwellConfig>,
    /// One draft per owner
    pub drafts: Arc<RwLock<HashMap<OwnerId, SubmissionPipeline>>>,
    /// Cached insight engines per owner
    pub insights: Arc<RwLock<HashMap<OwnerId, Arc<InsightEngine>>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, capabilities: Capabilities, config: InkwellConfig) -> Self {
        Self {
            db,
            capabilities,
            config: Arc::new(config),
            drafts: Arc::new(RwLock::new(HashMap::new())),
            insights: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
        }
    }

    /// The owner's draft, created on first use
    pub async fn pipeline_for(&self, owner: &OwnerId) -> SubmissionPipeline {
        if let Some(pipeline) = self.drafts.read().await.get(owner) {
            return pipeline.clone();
        }

        let mut drafts = self.drafts.write().await;
        drafts
            .entry(owner.clone())
            .or_insert_with(|| {
                tracing::debug!(owner = %owner, "Creating draft");
                SubmissionPipeline::new(owner.clone(), self.capabilities.clone())
            })
            .clone()
    }

    /// The owner's insight engine, created on first use
    pub async fn insight_engine_for(&self, owner: &OwnerId) -> Arc<InsightEngine> {
        if let Some(engine) = self.insights.read().await.get(owner) {
            return engine.clone();
        }

        let mut insights = self.insights.write().await;
        insights
            .entry(owner.clone())
            .or_insert_with(|| Arc::new(InsightEngine::new(owner.clone(), self.capabilities.clone())))
            .clone()
    }

    /// Forget the owner's cached entry fetch; returns whether one existed
    pub async fn drop_insight_cache(&self, owner: &OwnerId) -> bool {
        self.insights.write().await.remove(owner).is_some()
    }

    /// Bound the per-owner state
    ///
    /// Removes expired sessions, drafts with nothing in them, and insight engines of
    /// owners who no longer hold a valid session. Engines and drafts in use by a
    /// request are kept.
    pub async fn housekeeping(&self) -> Housekeeping {
        let now = inkwell_common::time::now();
        let mut report = Housekeeping::default();

        match auth::purge_expired_sessions(&self.db, now).await {
            Ok(purged) => report.sessions_purged = purged,
            Err(e) => tracing::warn!(error = %e, "Session purge failed"),
        }

        {
            let mut drafts = self.drafts.write().await;
            let before = drafts.len();
            drafts.retain(|_, pipeline| !pipeline.is_vacant());
            report.drafts_evicted = before - drafts.len();
        }

        let idle_owners: Vec<OwnerId> = self
            .insights
            .read()
            .await
            .iter()
            .filter(|(_, engine)| Arc::strong_count(engine) == 1)
            .map(|(owner, _)| owner.clone())
            .collect();
        for owner in idle_owners {
            match auth::has_active_session(&self.db, &owner, now).await {
                Ok(true) => {}
                Ok(false) => {
                    let mut insights = self.insights.write().await;
                    if insights.get(&owner).is_some_and(|engine| Arc::strong_count(engine) == 1) {
                        insights.remove(&owner);
                        report.insight_engines_evicted += 1;
                    }
                }
                Err(e) => tracing::warn!(owner = %owner, error = %e, "Session lookup failed"),
            }
        }

        if report != Housekeeping::default() {
            tracing::info!(
                sessions = report.sessions_purged,
                drafts = report.drafts_evicted,
                insight_engines = report.insight_engines_evicted,
                "Housekeeping removed stale state"
            );
        }
        report
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);

    Router::new()
        .merge(api::health_routes())
        .merge(api::session_routes())
        .merge(api::transcription_routes())
        .merge(api::draft_routes())
        .merge(api::entry_routes())
        .merge(api::insight_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
