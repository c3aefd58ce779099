//! Durable FIFO queue of offline mutations.
//!
//! Append-only while offline; drained in identifier order on reconnect.
//! Entries are removed only after the corresponding remote call succeeds
//! and are never mutated in place. No deduplication: a create followed by a
//! delete of the same logical entity replays both actions, in order.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::store::StoreError;
use crate::types::{QueueEntry, QueuedAction};

/// SQLite-backed queue handle; cheap to clone.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    pool: SqlitePool,
}

impl SyncQueue {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a new entry. Fails only on storage failure, which is fatal to
    /// the offline path and surfaced to the caller.
    pub async fn enqueue(&self, action: &QueuedAction) -> Result<QueueEntry, StoreError> {
        let enqueued_at = Utc::now();
        let payload = serde_json::to_string(action).context("failed to serialize queued action")?;

        let result = sqlx::query(
            r#"
            INSERT INTO sync_queue (kind, payload, enqueued_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(action.kind())
        .bind(&payload)
        .bind(enqueued_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("failed to append sync queue entry")?;

        Ok(QueueEntry {
            id: result.last_insert_rowid(),
            action: action.clone(),
            enqueued_at,
        })
    }

    /// Pending entries in enqueue order.
    pub async fn entries(&self) -> Result<Vec<QueueEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, payload, enqueued_at FROM sync_queue ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list sync queue entries")?;

        rows.iter().map(row_to_entry).collect()
    }

    /// Delete one entry after its remote call succeeded.
    pub async fn remove(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sync_queue WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to remove sync queue entry")?;
        Ok(())
    }

    pub async fn len(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM sync_queue")
            .fetch_one(&self.pool)
            .await
            .context("failed to count sync queue entries")?;
        let n: i64 = row.try_get("n").context("missing count column")?;
        Ok(n as u64)
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<QueueEntry, StoreError> {
    let id: i64 = row.try_get("id").context("missing id column")?;

    let payload: String = row.try_get("payload").context("missing payload column")?;
    let action: QueuedAction =
        serde_json::from_str(&payload).context("invalid payload in sync_queue")?;

    let enqueued_at_str: String = row
        .try_get("enqueued_at")
        .context("missing enqueued_at column")?;
    let enqueued_at = DateTime::parse_from_rfc3339(&enqueued_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .context("invalid enqueued_at in sync_queue")?;

    Ok(QueueEntry {
        id,
        action,
        enqueued_at,
    })
}
