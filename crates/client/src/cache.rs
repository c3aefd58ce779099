//! Local read model cache for offline support.
//!
//! A keyed mirror of server state: read-through while online, the only data
//! source while offline, never authoritative. Rows store the serialized
//! entity keyed by its identifier.

use anyhow::Context;
use sqlx::{Row, SqlitePool};

use oficina_core::{RecordId, WarrantyId};
use oficina_maintenance::MaintenanceRecord;
use oficina_warranty::WarrantyRecord;

use crate::store::StoreError;

/// SQLite-backed cache handle; cheap to clone.
#[derive(Debug, Clone)]
pub struct LocalCache {
    pool: SqlitePool,
}

impl LocalCache {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert one maintenance record.
    pub async fn put_record(&self, record: &MaintenanceRecord) -> Result<(), StoreError> {
        let payload =
            serde_json::to_string(record).context("failed to serialize maintenance record")?;
        sqlx::query(
            r#"
            INSERT INTO records (id, data)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(record.id.as_millis())
        .bind(&payload)
        .execute(&self.pool)
        .await
        .context("failed to upsert maintenance record in cache")?;
        Ok(())
    }

    /// All cached maintenance records, newest identifier first.
    pub async fn records(&self) -> Result<Vec<MaintenanceRecord>, StoreError> {
        let rows = sqlx::query("SELECT data FROM records ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list cached maintenance records")?;

        rows.iter()
            .map(|row| {
                let data: String = row.try_get("data").context("missing data column")?;
                serde_json::from_str(&data)
                    .context("invalid cached maintenance record")
                    .map_err(StoreError::from)
            })
            .collect()
    }

    pub async fn get_record(&self, id: RecordId) -> Result<Option<MaintenanceRecord>, StoreError> {
        let row = sqlx::query("SELECT data FROM records WHERE id = ?1")
            .bind(id.as_millis())
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch cached maintenance record")?;

        match row {
            Some(row) => {
                let data: String = row.try_get("data").context("missing data column")?;
                let record =
                    serde_json::from_str(&data).context("invalid cached maintenance record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_record(&self, id: RecordId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM records WHERE id = ?1")
            .bind(id.as_millis())
            .execute(&self.pool)
            .await
            .context("failed to delete cached maintenance record")?;
        Ok(())
    }

    /// Atomically replace the whole maintenance mirror with remote state.
    pub async fn replace_records(&self, records: &[MaintenanceRecord]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin cache refresh transaction")?;

        sqlx::query("DELETE FROM records")
            .execute(&mut *tx)
            .await
            .context("failed to clear maintenance cache")?;

        for record in records {
            let payload =
                serde_json::to_string(record).context("failed to serialize maintenance record")?;
            sqlx::query("INSERT INTO records (id, data) VALUES (?1, ?2)")
                .bind(record.id.as_millis())
                .bind(&payload)
                .execute(&mut *tx)
                .await
                .context("failed to insert maintenance record during refresh")?;
        }

        tx.commit()
            .await
            .context("failed to commit cache refresh transaction")?;
        Ok(())
    }

    /// Upsert one warranty.
    pub async fn put_warranty(&self, warranty: &WarrantyRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_string(warranty).context("failed to serialize warranty")?;
        sqlx::query(
            r#"
            INSERT INTO warranties (id, data)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(warranty.id.as_millis())
        .bind(&payload)
        .execute(&self.pool)
        .await
        .context("failed to upsert warranty in cache")?;
        Ok(())
    }

    /// All cached warranties, newest identifier first.
    pub async fn warranties(&self) -> Result<Vec<WarrantyRecord>, StoreError> {
        let rows = sqlx::query("SELECT data FROM warranties ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list cached warranties")?;

        rows.iter()
            .map(|row| {
                let data: String = row.try_get("data").context("missing data column")?;
                serde_json::from_str(&data)
                    .context("invalid cached warranty")
                    .map_err(StoreError::from)
            })
            .collect()
    }

    pub async fn delete_warranty(&self, id: WarrantyId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM warranties WHERE id = ?1")
            .bind(id.as_millis())
            .execute(&self.pool)
            .await
            .context("failed to delete cached warranty")?;
        Ok(())
    }

    /// Atomically replace the whole warranty mirror with remote state.
    pub async fn replace_warranties(&self, warranties: &[WarrantyRecord]) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin cache refresh transaction")?;

        sqlx::query("DELETE FROM warranties")
            .execute(&mut *tx)
            .await
            .context("failed to clear warranty cache")?;

        for warranty in warranties {
            let payload =
                serde_json::to_string(warranty).context("failed to serialize warranty")?;
            sqlx::query("INSERT INTO warranties (id, data) VALUES (?1, ?2)")
                .bind(warranty.id.as_millis())
                .bind(&payload)
                .execute(&mut *tx)
                .await
                .context("failed to insert warranty during refresh")?;
        }

        tx.commit()
            .await
            .context("failed to commit cache refresh transaction")?;
        Ok(())
    }
}
