//! `oficina-warranty` — service warranty certificates.
//!
//! Pure domain crate: warranty shape, the expiry derivation rule, input
//! validation, partial updates, and the status classifier. No I/O.

pub mod status;
pub mod warranty;

pub use status::{classify, WarrantyStatus};
pub use warranty::{expiry, NewWarranty, WarrantyRecord, WarrantyUpdate};
