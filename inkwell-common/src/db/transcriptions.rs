//! Raw transcription rows written by the ingestion endpoint

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{OwnerId, RawTranscription};
use crate::{time, Error, Result};

/// Store a raw transcription and return its id
pub async fn insert_raw_transcription(
    pool: &SqlitePool,
    owner: &OwnerId,
    content: &str,
    original_files: &[String],
    created_at: DateTime<Utc>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let files = serde_json::to_string(original_files)
        .map_err(|e| Error::Internal(format!("Failed to serialize file names: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO transcriptions (id, owner_id, content, original_files, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(owner.as_str())
    .bind(content)
    .bind(files)
    .bind(time::to_storage(&created_at))
    .execute(pool)
    .await?;

    Ok(id)
}

/// Load a raw transcription of `owner`
pub async fn get_raw_transcription(
    pool: &SqlitePool,
    owner: &OwnerId,
    id: Uuid,
) -> Result<Option<RawTranscription>> {
    let row = sqlx::query(
        r#"
        SELECT id, owner_id, content, original_files, created_at
        FROM transcriptions
        WHERE owner_id = ? AND id = ?
        "#,
    )
    .bind(owner.as_str())
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let files: String = row.get("original_files");
    let original_files: Vec<String> = serde_json::from_str(&files)
        .map_err(|e| Error::Internal(format!("Failed to deserialize file names: {}", e)))?;
    let created_at: String = row.get("created_at");

    Ok(Some(RawTranscription {
        id,
        owner_id: OwnerId::new(row.get::<String, _>("owner_id")),
        content: row.get("content"),
        original_files,
        created_at: time::from_storage(&created_at)?,
    }))
}
