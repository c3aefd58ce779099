//! Durable client-side storage (SQLite).
//!
//! One database file holds the cached read models and the sync queue, so
//! the whole offline state survives restarts as a unit. The store is opened
//! explicitly at startup and closed at shutdown; components receive
//! [`LocalCache`]/[`SyncQueue`] handles cloned from it instead of reaching
//! for ambient state.

use std::path::Path;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::cache::LocalCache;
use crate::queue::SyncQueue;

/// Client-side storage failure. Fatal to the offline path.
#[derive(Debug, Error)]
#[error("client storage failure: {0:#}")]
pub struct StoreError(#[from] anyhow::Error);

/// Handle to the client database; owns the connection pool.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    pool: SqlitePool,
}

impl OfflineStore {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open client store at {}", path.display()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id   INTEGER PRIMARY KEY,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create records table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warranties (
                id   INTEGER PRIMARY KEY,
                data TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create warranties table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sync_queue (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                kind        TEXT NOT NULL,
                payload     TEXT NOT NULL,
                enqueued_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create sync_queue table")?;

        Ok(Self { pool })
    }

    /// Handle to the cached read models.
    pub fn cache(&self) -> LocalCache {
        LocalCache::new(self.pool.clone())
    }

    /// Handle to the pending-mutation queue.
    pub fn queue(&self) -> SyncQueue {
        SyncQueue::new(self.pool.clone())
    }

    /// Close the pool; in-flight writes are completed first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QueuedAction;
    use chrono::Utc;
    use oficina_core::RecordId;
    use oficina_maintenance::NewMaintenanceRecord;

    fn sample_new_record() -> NewMaintenanceRecord {
        NewMaintenanceRecord {
            customer: "Ana Souza".to_string(),
            vehicle_model: "CG 160".to_string(),
            oil_type: "10W30".to_string(),
            contact: "(11) 99999-0000".to_string(),
            last_service: "2026-01-01".parse().unwrap(),
            interval_days: 30,
        }
    }

    #[tokio::test]
    async fn cache_and_queue_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.db");

        let store = OfflineStore::open(&path).await.unwrap();
        let record = sample_new_record()
            .into_record(RecordId::from_millis(42), Utc::now())
            .unwrap();
        store.cache().put_record(&record).await.unwrap();
        store
            .queue()
            .enqueue(&QueuedAction::DeleteRecord {
                id: RecordId::from_millis(7),
            })
            .await
            .unwrap();
        store.close().await;

        let reopened = OfflineStore::open(&path).await.unwrap();
        let records = reopened.cache().records().await.unwrap();
        assert_eq!(records, vec![record]);

        let entries = reopened.queue().entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].action,
            QueuedAction::DeleteRecord {
                id: RecordId::from_millis(7)
            }
        );
        reopened.close().await;
    }
}
