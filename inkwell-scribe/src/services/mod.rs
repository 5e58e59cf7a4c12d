//! Read-side services over submitted entries

pub mod entry_browser;
pub mod insight_engine;
pub mod insight_parser;

use thiserror::Error;
use uuid::Uuid;

use crate::capability::CapabilityError;

pub use entry_browser::{preview, EntryBrowser, EntryPreview};
pub use insight_engine::InsightEngine;
pub use insight_parser::{parse_insights, InsightItem};

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("Entry not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to load journal entries: {0}")]
    Capability(#[from] CapabilityError),
}

#[derive(Debug, Error)]
pub enum InsightError {
    /// Nothing to analyze; raised before any summarization call
    #[error("No journal entries found to analyze")]
    NoEntries,

    #[error("No insights were generated from the analysis")]
    NoInsights,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
