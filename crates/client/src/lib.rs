//! `oficina-client`
//!
//! **Responsibility:** offline-first client core for the shop API.
//!
//! This crate provides:
//! - A durable local mirror of server state (SQLite)
//! - A FIFO sync queue of offline mutations, replayed on reconnect
//! - A connectivity state machine with serialized drains
//! - An offline-first facade implementing the online/offline write split
//!
//! The server remains the authority; the cache is never a source of truth
//! while online.

pub mod cache;
pub mod monitor;
pub mod queue;
pub mod remote;
pub mod service;
pub mod store;
pub mod sync;
pub mod types;
pub mod worker;

#[cfg(test)]
mod testing;

pub use cache::LocalCache;
pub use monitor::{ConnectivityMonitor, SignalOutcome};
pub use queue::SyncQueue;
pub use remote::{HttpRemote, RemoteApi, RemoteError};
pub use service::{ClientError, ShopClient};
pub use store::{OfflineStore, StoreError};
pub use sync::{SyncEngine, SyncError};
pub use types::{
    ConnectivityState, DrainOutcome, DrainReport, DrainState, QueueEntry, QueuedAction,
};
pub use worker::{RefreshWorker, REFRESH_INTERVAL};
