//! Maintenance status classification.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// How many days ahead of the due date a record starts warning.
pub const WARNING_WINDOW_DAYS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    Ok,
    Warning,
    Overdue,
}

/// Classify a due date against `today`.
///
/// Overdue strictly past, warning from today through `today + 3` inclusive.
/// Operates on calendar dates only; time-of-day must never influence the
/// result.
pub fn classify(next_due: NaiveDate, today: NaiveDate) -> MaintenanceStatus {
    if next_due < today {
        MaintenanceStatus::Overdue
    } else if next_due <= today + Days::new(WARNING_WINDOW_DAYS) {
        MaintenanceStatus::Warning
    } else {
        MaintenanceStatus::Ok
    }
}
