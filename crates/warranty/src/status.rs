//! Warranty status classification.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// How many days ahead of the expiry date a warranty starts warning.
pub const WARNING_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarrantyStatus {
    Active,
    Warning,
    Expired,
}

/// Classify an expiry date against `today`.
///
/// Expired strictly past, warning from today through `today + 7` inclusive.
/// Operates on calendar dates only; time-of-day must never influence the
/// result.
pub fn classify(expiry: NaiveDate, today: NaiveDate) -> WarrantyStatus {
    if expiry < today {
        WarrantyStatus::Expired
    } else if expiry <= today + Days::new(WARNING_WINDOW_DAYS) {
        WarrantyStatus::Warning
    } else {
        WarrantyStatus::Active
    }
}
