//! Shared client-side types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oficina_core::{RecordId, WarrantyId};
use oficina_maintenance::NewMaintenanceRecord;
use oficina_warranty::NewWarranty;

use crate::remote::RemoteError;

/// Connectivity state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// Online and talking to the API directly.
    Online,
    /// Offline (network unreachable); mutations go to the queue.
    Offline,
}

/// A mutation captured while offline, replayed against the server on
/// reconnect.
///
/// `UpdateRecord` replays the mark-complete call; the server rebases the
/// schedule on its own current date at replay time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum QueuedAction {
    CreateRecord(NewMaintenanceRecord),
    UpdateRecord { id: RecordId },
    DeleteRecord { id: RecordId },
    CreateWarranty(NewWarranty),
    DeleteWarranty { id: WarrantyId },
}

impl QueuedAction {
    /// Stable kind label stored alongside the serialized payload.
    pub fn kind(&self) -> &'static str {
        match self {
            QueuedAction::CreateRecord(_) => "create_record",
            QueuedAction::UpdateRecord { .. } => "update_record",
            QueuedAction::DeleteRecord { .. } => "delete_record",
            QueuedAction::CreateWarranty(_) => "create_warranty",
            QueuedAction::DeleteWarranty { .. } => "delete_warranty",
        }
    }
}

/// A durable sync-queue row. Never mutated in place: it is created on
/// enqueue and deleted once its remote call succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Auto-incrementing storage identifier; drain order.
    pub id: i64,
    pub action: QueuedAction,
    pub enqueued_at: DateTime<Utc>,
}

/// Observable lifecycle of a queue drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Idle,
    Draining,
    Completed,
    /// Halted at the named entry; it and everything after it are untouched
    /// until the next drain attempt.
    Stalled { entry_id: i64 },
}

/// How a drain pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    Completed,
    Stalled { entry_id: i64, error: RemoteError },
}

/// Result of one drain pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries applied remotely and removed from the queue, in order.
    pub applied: Vec<i64>,
    pub outcome: DrainOutcome,
    /// Whether cached views were refreshed from the remote store afterwards.
    pub refreshed: bool,
}
