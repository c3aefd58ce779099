//! Queue replay against the remote store.
//!
//! The drain is modeled as an explicit state machine so a stalled queue is
//! observable rather than inferred from logs:
//! `Idle -> Draining -> Completed | Stalled { entry_id }`.

use std::sync::Mutex;

use thiserror::Error;

use crate::cache::LocalCache;
use crate::queue::SyncQueue;
use crate::remote::{self, RemoteApi};
use crate::store::StoreError;
use crate::types::{DrainOutcome, DrainReport, DrainState};

/// Failure of the sync machinery itself (local storage). Remote-call
/// failures are not errors at this level; they end the drain as `Stalled`.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Replays the sync queue against the remote store and refreshes the cache.
pub struct SyncEngine<R> {
    remote: R,
    cache: LocalCache,
    queue: SyncQueue,
    state: Mutex<DrainState>,
}

impl<R: RemoteApi + Sync> SyncEngine<R> {
    pub fn new(remote: R, cache: LocalCache, queue: SyncQueue) -> Self {
        Self {
            remote,
            cache,
            queue,
            state: Mutex::new(DrainState::Idle),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    /// Current position in the drain lifecycle.
    pub fn state(&self) -> DrainState {
        *self.state.lock().unwrap()
    }

    /// Replay pending entries in enqueue order, one remote call at a time.
    ///
    /// Halts at the first failed call, leaving that entry and every later
    /// one untouched; FIFO ordering is never violated at the cost of
    /// blocking later mutations on one stuck entry. If at least one entry
    /// was removed, cached views are refreshed from the remote store
    /// afterwards.
    pub async fn drain(&self) -> Result<DrainReport, SyncError> {
        *self.state.lock().unwrap() = DrainState::Draining;

        let result = self.drain_pass().await;

        let next = match &result {
            Ok(report) => match &report.outcome {
                DrainOutcome::Completed => DrainState::Completed,
                DrainOutcome::Stalled { entry_id, .. } => DrainState::Stalled {
                    entry_id: *entry_id,
                },
            },
            Err(_) => DrainState::Idle,
        };
        *self.state.lock().unwrap() = next;

        result
    }

    async fn drain_pass(&self) -> Result<DrainReport, SyncError> {
        let entries = self.queue.entries().await?;
        tracing::debug!(pending = entries.len(), "draining sync queue");

        let mut applied = Vec::new();
        let mut outcome = DrainOutcome::Completed;

        for entry in entries {
            match remote::apply(&self.remote, &entry.action).await {
                Ok(()) => {
                    self.queue.remove(entry.id).await?;
                    tracing::info!(entry = entry.id, kind = entry.action.kind(), "synced queued action");
                    applied.push(entry.id);
                }
                Err(err) => {
                    tracing::warn!(
                        entry = entry.id,
                        kind = entry.action.kind(),
                        %err,
                        "drain halted at failing entry"
                    );
                    outcome = DrainOutcome::Stalled {
                        entry_id: entry.id,
                        error: err,
                    };
                    break;
                }
            }
        }

        let refreshed = if applied.is_empty() {
            false
        } else {
            self.refresh().await
        };

        Ok(DrainReport {
            applied,
            outcome,
            refreshed,
        })
    }

    /// Pull full remote state into the cache, records then warranties.
    ///
    /// Failures are logged and reported as `false`, not escalated; the next
    /// poll or drain tries again.
    pub async fn refresh(&self) -> bool {
        let records = match self.remote.fetch_records().await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(%err, "cache refresh failed fetching records");
                return false;
            }
        };
        let warranties = match self.remote.fetch_warranties().await {
            Ok(warranties) => warranties,
            Err(err) => {
                tracing::warn!(%err, "cache refresh failed fetching warranties");
                return false;
            }
        };

        if let Err(err) = self.cache.replace_records(&records).await {
            tracing::error!(%err, "cache refresh failed storing records");
            return false;
        }
        if let Err(err) = self.cache.replace_warranties(&warranties).await {
            tracing::error!(%err, "cache refresh failed storing warranties");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OfflineStore;
    use crate::testing::{fixture_record, ScriptedRemote};
    use crate::types::QueuedAction;
    use oficina_core::RecordId;

    async fn engine_with_entries(
        remote: ScriptedRemote,
        entry_count: i64,
    ) -> (SyncEngine<ScriptedRemote>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = OfflineStore::open(dir.path().join("client.db")).await.unwrap();
        let queue = store.queue();
        for n in 1..=entry_count {
            queue
                .enqueue(&QueuedAction::DeleteRecord {
                    id: RecordId::from_millis(n),
                })
                .await
                .unwrap();
        }
        (SyncEngine::new(remote, store.cache(), queue), dir)
    }

    #[tokio::test]
    async fn successful_drain_empties_queue_and_refreshes_once() {
        let remote = ScriptedRemote::new();
        remote.set_records(vec![fixture_record(99)]);
        let (engine, _dir) = engine_with_entries(remote, 3).await;

        let report = engine.drain().await.unwrap();

        assert_eq!(report.applied.len(), 3);
        assert_eq!(report.outcome, DrainOutcome::Completed);
        assert!(report.refreshed);
        assert_eq!(engine.state(), DrainState::Completed);
        assert!(engine.queue().is_empty().await.unwrap());
        assert_eq!(engine.remote().fetch_count(), 1);

        let cached = engine.cache().records().await.unwrap();
        assert_eq!(cached, vec![fixture_record(99)]);
    }

    #[tokio::test]
    async fn drain_halts_at_first_failure_keeping_later_entries_in_order() {
        let remote = ScriptedRemote::failing_on([2]);
        let (engine, _dir) = engine_with_entries(remote, 3).await;
        let before = engine.queue().entries().await.unwrap();

        let report = engine.drain().await.unwrap();

        assert_eq!(report.applied, vec![before[0].id]);
        let stalled_at = before[1].id;
        assert!(matches!(
            report.outcome,
            DrainOutcome::Stalled { entry_id, .. } if entry_id == stalled_at
        ));
        assert_eq!(engine.state(), DrainState::Stalled { entry_id: stalled_at });
        // One entry was removed, so the cache still refreshes.
        assert!(report.refreshed);

        let remaining = engine.queue().entries().await.unwrap();
        assert_eq!(remaining, vec![before[1].clone(), before[2].clone()]);
    }

    #[tokio::test]
    async fn failure_on_the_first_entry_skips_the_refresh() {
        let remote = ScriptedRemote::failing_on([1]);
        let (engine, _dir) = engine_with_entries(remote, 2).await;

        let report = engine.drain().await.unwrap();

        assert!(report.applied.is_empty());
        assert!(!report.refreshed);
        assert_eq!(engine.remote().fetch_count(), 0);
        assert_eq!(engine.queue().len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn draining_an_empty_queue_completes_without_refreshing() {
        let (engine, _dir) = engine_with_entries(ScriptedRemote::new(), 0).await;

        let report = engine.drain().await.unwrap();

        assert_eq!(report.outcome, DrainOutcome::Completed);
        assert!(!report.refreshed);
        assert_eq!(engine.state(), DrainState::Completed);
    }

    #[tokio::test]
    async fn create_then_delete_of_the_same_entity_replays_both() {
        let dir = tempfile::tempdir().unwrap();
        let store = OfflineStore::open(dir.path().join("client.db")).await.unwrap();
        let queue = store.queue();
        let new = crate::testing::fixture_new_record();
        queue
            .enqueue(&QueuedAction::CreateRecord(new))
            .await
            .unwrap();
        queue
            .enqueue(&QueuedAction::DeleteRecord {
                id: RecordId::from_millis(1),
            })
            .await
            .unwrap();

        let engine = SyncEngine::new(ScriptedRemote::new(), store.cache(), queue);
        let report = engine.drain().await.unwrap();

        assert_eq!(report.applied.len(), 2);
        assert_eq!(
            engine.remote().applied_kinds(),
            vec!["create_record", "delete_record"]
        );
    }
}
