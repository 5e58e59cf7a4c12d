//! Capability Client: the boundary to the vision/language provider and the store
//!
//! Three seams, each a trait so the pipeline can be driven by fakes in tests:
//! - [`Transcriber`]: image → text
//! - [`Summarizer`]: text + mode → text (titles and insight analysis)
//! - [`JournalStore`]: per-owner persistence of entries and raw transcriptions
//!
//! Every call may fail. Nothing here retries; retry is always a user action.

pub mod openai;
pub mod prompts;
pub mod sqlite_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkwell_common::{JournalEntry, NewJournalEntry, OwnerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use openai::OpenAiClient;
pub use sqlite_store::SqliteStore;

/// Failure of any external capability call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CapabilityError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider rejected the API credential")]
    Unauthorized,

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Image bytes ready to send for transcription
///
/// Cloning shares the underlying bytes.
#[derive(Clone, PartialEq)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// What a summarization request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Short title for a single entry
    Title,
    Themes,
    Focus,
    Mood,
    Goals,
}

/// Analysis modes offered by the Insight Engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightMode {
    Themes,
    Focus,
    Mood,
    Goals,
}

impl InsightMode {
    pub const ALL: [InsightMode; 4] = [
        InsightMode::Themes,
        InsightMode::Focus,
        InsightMode::Mood,
        InsightMode::Goals,
    ];

    pub fn summary_mode(self) -> SummaryMode {
        match self {
            InsightMode::Themes => SummaryMode::Themes,
            InsightMode::Focus => SummaryMode::Focus,
            InsightMode::Mood => SummaryMode::Mood,
            InsightMode::Goals => SummaryMode::Goals,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InsightMode::Themes => "themes",
            InsightMode::Focus => "focus",
            InsightMode::Mood => "mood",
            InsightMode::Goals => "goals",
        }
    }

    /// Display title
    pub fn title(self) -> &'static str {
        match self {
            InsightMode::Themes => "Recurring Themes",
            InsightMode::Focus => "Focus Suggestions",
            InsightMode::Mood => "Mood Analysis",
            InsightMode::Goals => "Goal Tracking",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InsightMode::Themes => "Identify patterns and common themes across your journal entries",
            InsightMode::Focus => "Get recommendations for personal growth and development",
            InsightMode::Mood => "Understand your emotional patterns and trends",
            InsightMode::Goals => "Track progress on your goals and get achievement suggestions",
        }
    }
}

impl fmt::Display for InsightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InsightMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown insight mode: {}", s))
    }
}

/// Image → text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, image: &ImagePayload) -> Result<String, CapabilityError>;
}

/// Text → text, shaped by `mode`
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, mode: SummaryMode) -> Result<String, CapabilityError>;
}

/// Persistence collaborator; implementations enforce per-owner isolation
#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn create_raw_transcription(
        &self,
        owner: &OwnerId,
        content: &str,
        original_files: &[String],
        created_at: DateTime<Utc>,
    ) -> Result<Uuid, CapabilityError>;

    /// Single atomic create; either the whole entry exists afterwards or nothing does
    async fn create_journal_entry(
        &self,
        owner: &OwnerId,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, CapabilityError>;

    /// Entries of `owner`, newest first
    async fn list_journal_entries(&self, owner: &OwnerId) -> Result<Vec<JournalEntry>, CapabilityError>;
}

/// The capability set handed to pipelines and engines
#[derive(Clone)]
pub struct Capabilities {
    pub transcriber: Arc<dyn Transcriber>,
    pub summarizer: Arc<dyn Summarizer>,
    pub store: Arc<dyn JournalStore>,
}

impl Capabilities {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
        store: Arc<dyn JournalStore>,
    ) -> Self {
        Self {
            transcriber,
            summarizer,
            store,
        }
    }

    /// One provider client serving both transcription and summarization
    pub fn from_provider<P>(provider: Arc<P>, store: Arc<dyn JournalStore>) -> Self
    where
        P: Transcriber + Summarizer + 'static,
    {
        Self {
            transcriber: provider.clone(),
            summarizer: provider,
            store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_mode_parses_case_insensitively() {
        assert_eq!("mood".parse::<InsightMode>().unwrap(), InsightMode::Mood);
        assert_eq!("GOALS".parse::<InsightMode>().unwrap(), InsightMode::Goals);
        assert!("title".parse::<InsightMode>().is_err());
    }

    #[test]
    fn test_insight_modes_map_to_summary_modes() {
        let modes: Vec<SummaryMode> = InsightMode::ALL.iter().map(|m| m.summary_mode()).collect();
        assert!(!modes.contains(&SummaryMode::Title));
        assert_eq!(modes.len(), 4);
    }

    #[test]
    fn test_image_payload_debug_hides_bytes() {
        let payload = ImagePayload {
            file_name: "p.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: Arc::from(vec![1u8, 2, 3]),
        };
        let debug = format!("{:?}", payload);
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }
}
