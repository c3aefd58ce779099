//! Offline-first client facade.
//!
//! Implements the write split: while online a mutation is one direct REST
//! call (a failure is reported to the caller and nothing is enqueued);
//! while offline the mutation lands in the local cache and the sync queue,
//! for replay on reconnect. Reads go to the server while online (refreshing
//! the mirror on the way) and to the cache while offline.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use oficina_core::{DomainError, RecordId, WarrantyId};
use oficina_maintenance::{MaintenanceRecord, NewMaintenanceRecord};
use oficina_warranty::{NewWarranty, WarrantyRecord};

use crate::cache::LocalCache;
use crate::monitor::ConnectivityMonitor;
use crate::queue::SyncQueue;
use crate::remote::{RemoteApi, RemoteError};
use crate::store::{OfflineStore, StoreError};
use crate::sync::SyncEngine;
use crate::types::{ConnectivityState, QueuedAction};
use crate::worker::RefreshWorker;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// High-level client over one offline store and one remote endpoint.
pub struct ShopClient<R> {
    engine: Arc<SyncEngine<R>>,
    monitor: Arc<ConnectivityMonitor<R>>,
    cache: LocalCache,
    queue: SyncQueue,
}

impl<R: RemoteApi + Sync> ShopClient<R> {
    /// `initial` comes from the platform's connectivity signal at startup.
    pub fn new(remote: R, store: &OfflineStore, initial: ConnectivityState) -> Self {
        let cache = store.cache();
        let queue = store.queue();
        let engine = Arc::new(SyncEngine::new(remote, cache.clone(), queue.clone()));
        let monitor = Arc::new(ConnectivityMonitor::new(initial, engine.clone()));
        Self {
            engine,
            monitor,
            cache,
            queue,
        }
    }

    /// The connectivity state machine; feed platform signals into it.
    pub fn monitor(&self) -> &Arc<ConnectivityMonitor<R>> {
        &self.monitor
    }

    pub fn engine(&self) -> &Arc<SyncEngine<R>> {
        &self.engine
    }

    fn remote(&self) -> &R {
        self.engine.remote()
    }

    /// Create a maintenance record.
    ///
    /// Online, the server assigns the identifier and derives `next_due`.
    /// Offline, both happen locally, the entity is flagged `offline_origin`,
    /// and the mutation is queued for replay.
    pub async fn create_record(
        &self,
        new: NewMaintenanceRecord,
    ) -> Result<MaintenanceRecord, ClientError> {
        // Invalid input never reaches the network or the queue.
        new.validate()?;

        if self.monitor.is_offline() {
            let mut record = new.clone().into_record(RecordId::generate(), Utc::now())?;
            record.offline_origin = true;
            self.cache.put_record(&record).await?;
            self.queue.enqueue(&QueuedAction::CreateRecord(new)).await?;
            Ok(record)
        } else {
            let record = self.remote().create_record(&new).await?;
            self.cache.put_record(&record).await?;
            Ok(record)
        }
    }

    /// Mark a maintenance record as done today, rebasing its schedule.
    pub async fn complete_record(&self, id: RecordId) -> Result<MaintenanceRecord, ClientError> {
        if self.monitor.is_offline() {
            let mut record = self
                .cache
                .get_record(id)
                .await?
                .ok_or(DomainError::NotFound)?;
            record.complete(Utc::now().date_naive());
            self.cache.put_record(&record).await?;
            self.queue
                .enqueue(&QueuedAction::UpdateRecord { id })
                .await?;
            Ok(record)
        } else {
            let record = self.remote().complete_record(id).await?;
            self.cache.put_record(&record).await?;
            Ok(record)
        }
    }

    pub async fn delete_record(&self, id: RecordId) -> Result<(), ClientError> {
        if self.monitor.is_offline() {
            self.cache.delete_record(id).await?;
            self.queue
                .enqueue(&QueuedAction::DeleteRecord { id })
                .await?;
        } else {
            self.remote().delete_record(id).await?;
            self.cache.delete_record(id).await?;
        }
        Ok(())
    }

    /// Create a warranty; same online/offline split as `create_record`.
    pub async fn create_warranty(&self, new: NewWarranty) -> Result<WarrantyRecord, ClientError> {
        new.validate()?;

        if self.monitor.is_offline() {
            let mut warranty = new.clone().into_record(WarrantyId::generate(), Utc::now())?;
            warranty.offline_origin = true;
            self.cache.put_warranty(&warranty).await?;
            self.queue
                .enqueue(&QueuedAction::CreateWarranty(new))
                .await?;
            Ok(warranty)
        } else {
            let warranty = self.remote().create_warranty(&new).await?;
            self.cache.put_warranty(&warranty).await?;
            Ok(warranty)
        }
    }

    pub async fn delete_warranty(&self, id: WarrantyId) -> Result<(), ClientError> {
        if self.monitor.is_offline() {
            self.cache.delete_warranty(id).await?;
            self.queue
                .enqueue(&QueuedAction::DeleteWarranty { id })
                .await?;
        } else {
            self.remote().delete_warranty(id).await?;
            self.cache.delete_warranty(id).await?;
        }
        Ok(())
    }

    /// All maintenance records: remote state (mirrored into the cache) while
    /// online, cached state while offline.
    pub async fn records(&self) -> Result<Vec<MaintenanceRecord>, ClientError> {
        if self.monitor.is_offline() {
            return Ok(self.cache.records().await?);
        }
        let records = self.remote().fetch_records().await?;
        self.cache.replace_records(&records).await?;
        Ok(records)
    }

    /// Records due on `today` or earlier.
    pub async fn pending_records(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<MaintenanceRecord>, ClientError> {
        let mut records = self.records().await?;
        records.retain(|r| r.is_pending(today));
        Ok(records)
    }

    /// All warranties: remote state while online, cached state while offline.
    pub async fn warranties(&self) -> Result<Vec<WarrantyRecord>, ClientError> {
        if self.monitor.is_offline() {
            return Ok(self.cache.warranties().await?);
        }
        let warranties = self.remote().fetch_warranties().await?;
        self.cache.replace_warranties(&warranties).await?;
        Ok(warranties)
    }

    /// Warranties not yet expired as of `today`.
    pub async fn active_warranties(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<WarrantyRecord>, ClientError> {
        let mut warranties = self.warranties().await?;
        warranties.retain(|w| w.is_active(today));
        Ok(warranties)
    }
}

impl<R: RemoteApi + Send + Sync + 'static> ShopClient<R> {
    /// Periodic refresh worker bound to this client's engine and monitor.
    pub fn refresh_worker(&self) -> RefreshWorker<R> {
        RefreshWorker::new(self.engine.clone(), self.monitor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OfflineStore;
    use crate::testing::{fixture_new_record, fixture_new_warranty, ScriptedRemote};

    async fn client(
        remote: ScriptedRemote,
        initial: ConnectivityState,
    ) -> (ShopClient<ScriptedRemote>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = OfflineStore::open(dir.path().join("client.db")).await.unwrap();
        (ShopClient::new(remote, &store, initial), dir)
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_network_or_the_queue() {
        let (client, _dir) = client(ScriptedRemote::new(), ConnectivityState::Offline).await;

        let mut new = fixture_new_record();
        new.customer = String::new();
        let err = client.create_record(new).await.unwrap_err();

        assert!(matches!(err, ClientError::Domain(_)));
        assert!(client.queue.is_empty().await.unwrap());
        assert_eq!(client.remote().mutation_count(), 0);
    }

    #[tokio::test]
    async fn offline_create_caches_flags_and_enqueues() {
        let (client, _dir) = client(ScriptedRemote::new(), ConnectivityState::Offline).await;

        let record = client.create_record(fixture_new_record()).await.unwrap();

        assert!(record.offline_origin);
        assert_eq!(record.next_due, "2026-01-31".parse().unwrap());
        assert_eq!(client.cache.records().await.unwrap(), vec![record]);

        let entries = client.queue.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action.kind(), "create_record");
        assert_eq!(client.remote().mutation_count(), 0);
    }

    #[tokio::test]
    async fn online_create_goes_straight_to_the_server() {
        let (client, _dir) = client(ScriptedRemote::new(), ConnectivityState::Online).await;

        let record = client.create_record(fixture_new_record()).await.unwrap();

        assert!(!record.offline_origin);
        assert!(client.queue.is_empty().await.unwrap());
        assert_eq!(client.remote().mutation_count(), 1);
        // The confirmed entity is mirrored locally.
        assert_eq!(client.cache.records().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn a_failed_online_mutation_is_reported_and_not_enqueued() {
        let (client, _dir) = client(ScriptedRemote::failing_on([1]), ConnectivityState::Online).await;

        let err = client.create_record(fixture_new_record()).await.unwrap_err();

        assert!(matches!(err, ClientError::Remote(_)));
        assert!(client.queue.is_empty().await.unwrap());
        assert!(client.cache.records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn offline_complete_rebases_the_cached_schedule_and_enqueues() {
        let (client, _dir) = client(ScriptedRemote::new(), ConnectivityState::Offline).await;
        let record = client.create_record(fixture_new_record()).await.unwrap();

        let updated = client.complete_record(record.id).await.unwrap();

        let today = Utc::now().date_naive();
        assert_eq!(updated.last_service, today);
        assert_eq!(
            updated.next_due,
            oficina_maintenance::next_due(today, updated.interval_days)
        );

        let kinds: Vec<_> = client
            .queue
            .entries()
            .await
            .unwrap()
            .iter()
            .map(|e| e.action.kind())
            .collect();
        assert_eq!(kinds, vec!["create_record", "update_record"]);
    }

    #[tokio::test]
    async fn completing_an_unknown_record_offline_is_not_found() {
        let (client, _dir) = client(ScriptedRemote::new(), ConnectivityState::Offline).await;

        let err = client
            .complete_record(RecordId::from_millis(404))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Domain(DomainError::NotFound)));
        assert!(client.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn offline_reads_come_from_the_cache() {
        let (client, _dir) = client(ScriptedRemote::new(), ConnectivityState::Offline).await;
        let record = client.create_record(fixture_new_record()).await.unwrap();
        let warranty = client.create_warranty(fixture_new_warranty()).await.unwrap();

        assert_eq!(client.records().await.unwrap(), vec![record.clone()]);
        assert_eq!(client.warranties().await.unwrap(), vec![warranty]);

        // fixture_new_record is due 2026-01-31; pending on any later date.
        let pending = client
            .pending_records("2026-03-01".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(pending, vec![record]);
    }
}
