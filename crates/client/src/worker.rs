//! Periodic remote refresh.
//!
//! Coarse consistency mechanism, separate from the sync core: re-poll the
//! server on a fixed interval regardless of queue activity, skipping polls
//! while offline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use crate::monitor::ConnectivityMonitor;
use crate::remote::RemoteApi;
use crate::sync::SyncEngine;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Background task refreshing cached views from the remote store.
pub struct RefreshWorker<R> {
    engine: Arc<SyncEngine<R>>,
    monitor: Arc<ConnectivityMonitor<R>>,
    shutdown: Arc<Notify>,
}

impl<R: RemoteApi + Send + Sync + 'static> RefreshWorker<R> {
    pub fn new(engine: Arc<SyncEngine<R>>, monitor: Arc<ConnectivityMonitor<R>>) -> Self {
        Self {
            engine,
            monitor,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for stopping the worker after `start` has consumed it.
    pub fn shutdown_trigger(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Spawn the refresh loop.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("refresh worker started");

            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = self.shutdown.notified() => {
                        break;
                    }
                    _ = interval.tick() => {
                        if self.monitor.is_offline() {
                            tracing::debug!("skipping refresh while offline");
                            continue;
                        }
                        self.engine.refresh().await;
                    }
                }
            }

            tracing::info!("refresh worker stopped");
        })
    }
}
