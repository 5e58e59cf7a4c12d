//! HTTP API handlers for inkwell-scribe
//!
//! Every route except `/health` and `/api/sessions` requires an
//! `Authorization: Bearer <token>` header, resolved by [`AuthenticatedOwner`].

pub mod auth;
pub mod draft;
pub mod entries;
pub mod health;
pub mod insights;
pub mod sessions;
pub mod transcriptions;

pub use auth::AuthenticatedOwner;
pub use draft::draft_routes;
pub use entries::entry_routes;
pub use health::health_routes;
pub use insights::insight_routes;
pub use sessions::session_routes;
pub use transcriptions::transcription_routes;
