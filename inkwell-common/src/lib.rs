//! # Inkwell Common Library
//!
//! Shared code for the Inkwell journaling service:
//! - Domain records (journal entries, raw transcriptions, owners)
//! - SQLite persistence scoped per owner
//! - Owner session resolution
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod error;
pub mod models;
pub mod time;

#[cfg(feature = "sqlx")]
pub mod auth;
#[cfg(feature = "sqlx")]
pub mod db;

pub use error::{Error, Result};
pub use models::{JournalEntry, NewJournalEntry, OwnerId, RawTranscription, ENTRY_SEPARATOR};
