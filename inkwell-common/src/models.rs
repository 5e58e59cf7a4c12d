//! Journal domain records shared between the store and the service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Separator placed between pages of an entry and between entries sent for analysis
pub const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

/// Join page or entry bodies with [`ENTRY_SEPARATOR`]
pub fn join_content<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut combined = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            combined.push_str(ENTRY_SEPARATOR);
        }
        combined.push_str(part.as_ref());
    }
    combined
}

/// Identity of the authenticated user owning journal rows
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A submitted journal entry. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Identifier assigned by the store
    pub id: Uuid,
    pub title: String,
    /// Page transcriptions joined with [`ENTRY_SEPARATOR`]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: OwnerId,
}

/// Journal entry about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub title: String,
    pub content: String,
    /// Defaults to the insert time when absent
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Raw transcription record created by the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTranscription {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub content: String,
    pub original_files: Vec<String>,
    pub created_at: DateTime<Utc>,
}
