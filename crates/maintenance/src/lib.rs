//! `oficina-maintenance` — recurring maintenance schedules.
//!
//! Pure domain crate: record shape, the next-due derivation rule, input
//! validation, and the status classifier. No I/O.

pub mod record;
pub mod status;

pub use record::{next_due, MaintenanceRecord, NewMaintenanceRecord};
pub use status::{classify, MaintenanceStatus};
