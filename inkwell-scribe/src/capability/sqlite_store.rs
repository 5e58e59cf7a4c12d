//! [`JournalStore`] backed by the shared SQLite database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkwell_common::{db, JournalEntry, NewJournalEntry, OwnerId};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{CapabilityError, JournalStore};

/// Store adapter over `inkwell_common::db`
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn store_error(e: inkwell_common::Error) -> CapabilityError {
    tracing::error!(error = %e, "Store operation failed");
    CapabilityError::Store(e.to_string())
}

#[async_trait]
impl JournalStore for SqliteStore {
    async fn create_raw_transcription(
        &self,
        owner: &OwnerId,
        content: &str,
        original_files: &[String],
        created_at: DateTime<Utc>,
    ) -> Result<Uuid, CapabilityError> {
        db::insert_raw_transcription(&self.pool, owner, content, original_files, created_at)
            .await
            .map_err(store_error)
    }

    async fn create_journal_entry(
        &self,
        owner: &OwnerId,
        entry: NewJournalEntry,
    ) -> Result<JournalEntry, CapabilityError> {
        db::insert_journal_entry(&self.pool, owner, entry)
            .await
            .map_err(store_error)
    }

    async fn list_journal_entries(&self, owner: &OwnerId) -> Result<Vec<JournalEntry>, CapabilityError> {
        db::list_journal_entries(&self.pool, owner)
            .await
            .map_err(store_error)
    }
}
