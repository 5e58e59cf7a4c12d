//! Entry Browser: read-only view over an owner's submitted entries

use chrono::{DateTime, Utc};
use inkwell_common::{JournalEntry, OwnerId};
use serde::Serialize;
use uuid::Uuid;

use super::BrowseError;
use crate::capability::JournalStore;

const PREVIEW_CHARS: usize = 100;

/// List row for one entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPreview {
    pub id: Uuid,
    pub title: String,
    pub preview: String,
    pub created_at: DateTime<Utc>,
}

impl From<&JournalEntry> for EntryPreview {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.clone(),
            preview: preview(&entry.content),
            created_at: entry.created_at,
        }
    }
}

/// First 100 characters, with `...` appended when the content is longer
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Entries fetched once, newest first, with a single selection
#[derive(Debug, Clone)]
pub struct EntryBrowser {
    entries: Vec<JournalEntry>,
    selected: Option<Uuid>,
}

impl EntryBrowser {
    /// Fetch all entries of `owner`; the newest one is selected
    pub async fn load(store: &dyn JournalStore, owner: &OwnerId) -> Result<Self, BrowseError> {
        let entries = store.list_journal_entries(owner).await?;
        tracing::debug!(owner = %owner, count = entries.len(), "Entries loaded");
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(mut entries: Vec<JournalEntry>) -> Self {
        // Stable, so equal timestamps keep store order
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let selected = entries.first().map(|e| e.id);
        Self { entries, selected }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn previews(&self) -> Vec<EntryPreview> {
        self.entries.iter().map(EntryPreview::from).collect()
    }

    pub fn selected(&self) -> Option<&JournalEntry> {
        let id = self.selected?;
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn select(&mut self, id: Uuid) -> Result<&JournalEntry, BrowseError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(BrowseError::NotFound(id))?;
        self.selected = Some(id);
        Ok(entry)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
