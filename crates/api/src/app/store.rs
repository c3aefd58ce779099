//! Flat-file persistence for the API.
//!
//! The whole dataset lives in one JSON document, loaded at startup and
//! rewritten on every mutation. A single async mutex serializes access; at
//! one-shop scale, rewrite-on-mutation beats operating a real database.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use oficina_core::{DomainResult, RecordId, WarrantyId};
use oficina_maintenance::MaintenanceRecord;
use oficina_warranty::WarrantyRecord;

/// Datastore failure (I/O or a malformed data file).
#[derive(Debug, Error)]
#[error("datastore failure: {0:#}")]
pub struct StoreError(#[from] anyhow::Error);

#[derive(Debug, Default, Serialize, Deserialize)]
struct ShopData {
    #[serde(default)]
    records: Vec<MaintenanceRecord>,
    #[serde(default)]
    warranties: Vec<WarrantyRecord>,
}

/// The authoritative store behind the REST surface.
#[derive(Debug)]
pub struct ShopStore {
    path: PathBuf,
    data: Mutex<ShopData>,
}

impl ShopStore {
    /// Load the data file; an absent file is an empty dataset.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("malformed data file at {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => ShopData::default(),
            Err(err) => {
                return Err(StoreError(anyhow::Error::new(err).context(format!(
                    "failed to read data file at {}",
                    path.display()
                ))));
            }
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    async fn persist(&self, data: &ShopData) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(data).context("failed to serialize data file")?;
        tokio::fs::write(&self.path, payload)
            .await
            .with_context(|| format!("failed to write data file at {}", self.path.display()))?;
        Ok(())
    }

    pub async fn records(&self) -> Vec<MaintenanceRecord> {
        self.data.lock().await.records.clone()
    }

    pub async fn pending_records(&self, today: NaiveDate) -> Vec<MaintenanceRecord> {
        self.data
            .lock()
            .await
            .records
            .iter()
            .filter(|r| r.is_pending(today))
            .cloned()
            .collect()
    }

    pub async fn insert_record(&self, record: MaintenanceRecord) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.records.push(record);
        self.persist(&data).await
    }

    /// Rebase a record's schedule on `today`. `Ok(None)` if the id is
    /// unknown.
    pub async fn complete_record(
        &self,
        id: RecordId,
        today: NaiveDate,
    ) -> Result<Option<MaintenanceRecord>, StoreError> {
        let mut data = self.data.lock().await;
        let Some(record) = data.records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.complete(today);
        let updated = record.clone();
        self.persist(&data).await?;
        Ok(Some(updated))
    }

    /// `Ok(false)` if the id is unknown.
    pub async fn remove_record(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let before = data.records.len();
        data.records.retain(|r| r.id != id);
        if data.records.len() == before {
            return Ok(false);
        }
        self.persist(&data).await?;
        Ok(true)
    }

    pub async fn warranties(&self) -> Vec<WarrantyRecord> {
        self.data.lock().await.warranties.clone()
    }

    pub async fn active_warranties(&self, today: NaiveDate) -> Vec<WarrantyRecord> {
        self.data
            .lock()
            .await
            .warranties
            .iter()
            .filter(|w| w.is_active(today))
            .cloned()
            .collect()
    }

    pub async fn get_warranty(&self, id: WarrantyId) -> Option<WarrantyRecord> {
        self.data
            .lock()
            .await
            .warranties
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    pub async fn insert_warranty(&self, warranty: WarrantyRecord) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;
        data.warranties.push(warranty);
        self.persist(&data).await
    }

    /// Apply a domain-validated update under the store lock. The outer
    /// result is storage, the middle one existence, the inner one domain
    /// validation; nothing is persisted unless the update succeeds.
    pub async fn update_warranty<F>(
        &self,
        id: WarrantyId,
        apply: F,
    ) -> Result<Option<DomainResult<WarrantyRecord>>, StoreError>
    where
        F: FnOnce(&mut WarrantyRecord) -> DomainResult<()>,
    {
        let mut data = self.data.lock().await;
        let Some(pos) = data.warranties.iter().position(|w| w.id == id) else {
            return Ok(None);
        };

        let mut updated = data.warranties[pos].clone();
        match apply(&mut updated) {
            Ok(()) => {
                data.warranties[pos] = updated.clone();
                self.persist(&data).await?;
                Ok(Some(Ok(updated)))
            }
            Err(err) => Ok(Some(Err(err))),
        }
    }

    /// `Ok(false)` if the id is unknown.
    pub async fn remove_warranty(&self, id: WarrantyId) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let before = data.warranties.len();
        data.warranties.retain(|w| w.id != id);
        if data.warranties.len() == before {
            return Ok(false);
        }
        self.persist(&data).await?;
        Ok(true)
    }
}
