//! Connectivity state machine.
//!
//! Driven externally by platform connectivity signals; never polls. An
//! `offline -> online` transition triggers exactly one drain attempt, and
//! drains are serialized by a single in-flight flag so a connectivity flap
//! during an in-progress drain cannot start a second concurrent one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::remote::RemoteApi;
use crate::sync::{SyncEngine, SyncError};
use crate::types::{ConnectivityState, DrainReport};

/// Tracks online/offline transitions and owns drain scheduling.
pub struct ConnectivityMonitor<R> {
    engine: Arc<SyncEngine<R>>,
    state: Mutex<ConnectivityState>,
    drain_in_flight: AtomicBool,
}

/// What one platform signal produced.
#[derive(Debug)]
pub enum SignalOutcome {
    /// State updated; no drain was due (went offline, or no transition).
    NoDrain,
    /// Entering online ran a drain to completion; its report is attached.
    Drained(Result<DrainReport, SyncError>),
    /// Entering online while a drain was already in flight; the attempt was
    /// suppressed to keep drains serialized.
    DrainSuppressed,
}

impl<R: RemoteApi + Sync> ConnectivityMonitor<R> {
    /// `initial` comes from the platform's current connectivity signal at
    /// startup.
    pub fn new(initial: ConnectivityState, engine: Arc<SyncEngine<R>>) -> Self {
        Self {
            engine,
            state: Mutex::new(initial),
            drain_in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ConnectivityState {
        *self.state.lock().unwrap()
    }

    pub fn is_offline(&self) -> bool {
        self.state() == ConnectivityState::Offline
    }

    /// Feed one platform signal.
    ///
    /// Every signal lands as a state update; an `offline -> online`
    /// transition additionally attempts one drain, awaited to completion
    /// here. Signals are never coalesced.
    pub async fn handle_signal(&self, signal: ConnectivityState) -> SignalOutcome {
        let previous = {
            let mut state = self.state.lock().unwrap();
            std::mem::replace(&mut *state, signal)
        };

        if previous == signal {
            return SignalOutcome::NoDrain;
        }

        match signal {
            ConnectivityState::Offline => {
                tracing::info!("connection lost; mutations will be queued locally");
                SignalOutcome::NoDrain
            }
            ConnectivityState::Online => {
                tracing::info!("connection restored");
                if self.drain_in_flight.swap(true, Ordering::SeqCst) {
                    tracing::debug!("drain already in flight; reconnect signal absorbed");
                    return SignalOutcome::DrainSuppressed;
                }
                let result = self.engine.drain().await;
                self.drain_in_flight.store(false, Ordering::SeqCst);
                SignalOutcome::Drained(result)
            }
        }
    }
}
