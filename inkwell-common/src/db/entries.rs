//! Journal entry rows

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::{JournalEntry, NewJournalEntry, OwnerId};
use crate::{time, Error, Result};

/// Insert a journal entry for `owner` as a single row
///
/// The id is generated here; `created_at` defaults to now.
pub async fn insert_journal_entry(
    pool: &SqlitePool,
    owner: &OwnerId,
    entry: NewJournalEntry,
) -> Result<JournalEntry> {
    let record = JournalEntry {
        id: Uuid::new_v4(),
        title: entry.title,
        content: entry.content,
        created_at: time::at_storage_precision(entry.created_at.unwrap_or_else(time::now)),
        owner_id: owner.clone(),
    };

    sqlx::query(
        r#"
        INSERT INTO journal_entries (id, owner_id, title, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(owner.as_str())
    .bind(&record.title)
    .bind(&record.content)
    .bind(time::to_storage(&record.created_at))
    .execute(pool)
    .await?;

    tracing::debug!(owner = %owner, entry_id = %record.id, "Journal entry stored");

    Ok(record)
}

/// All entries of `owner`, newest first
pub async fn list_journal_entries(pool: &SqlitePool, owner: &OwnerId) -> Result<Vec<JournalEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, owner_id, title, content, created_at
        FROM journal_entries
        WHERE owner_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(owner.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

fn entry_from_row(row: &SqliteRow) -> Result<JournalEntry> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Invalid entry id '{}': {}", id, e)))?;
    let created_at: String = row.get("created_at");

    Ok(JournalEntry {
        id,
        title: row.get("title"),
        content: row.get("content"),
        created_at: time::from_storage(&created_at)?,
        owner_id: OwnerId::new(row.get::<String, _>("owner_id")),
    })
}
