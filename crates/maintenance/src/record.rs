use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use oficina_core::{DomainError, DomainResult, RecordId};

/// One motorcycle's recurring maintenance schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: RecordId,
    pub customer: String,
    pub vehicle_model: String,
    pub oil_type: String,
    pub contact: String,
    pub last_service: NaiveDate,
    pub interval_days: u32,
    /// Derived: `last_service + interval_days`. Recomputed on every change
    /// to `last_service` or `interval_days`, never edited directly.
    pub next_due: NaiveDate,
    /// Created locally while offline and not yet confirmed by the server.
    #[serde(default)]
    pub offline_origin: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a maintenance record. The identifier and the derived
/// fields are assigned at creation time, by whichever side (server or
/// offline client) materializes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaintenanceRecord {
    pub customer: String,
    pub vehicle_model: String,
    pub oil_type: String,
    pub contact: String,
    pub last_service: NaiveDate,
    pub interval_days: u32,
}

impl NewMaintenanceRecord {
    pub fn validate(&self) -> DomainResult<()> {
        if self.customer.trim().is_empty() {
            return Err(DomainError::validation("customer is required"));
        }
        if self.vehicle_model.trim().is_empty() {
            return Err(DomainError::validation("vehicle_model is required"));
        }
        if self.oil_type.trim().is_empty() {
            return Err(DomainError::validation("oil_type is required"));
        }
        if self.contact.trim().is_empty() {
            return Err(DomainError::validation("contact is required"));
        }
        if self.interval_days == 0 {
            return Err(DomainError::validation("interval_days must be at least 1"));
        }
        Ok(())
    }

    /// Materialize the record under the given identifier and creation
    /// instant, deriving `next_due`.
    pub fn into_record(
        self,
        id: RecordId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<MaintenanceRecord> {
        self.validate()?;
        let due = next_due(self.last_service, self.interval_days);
        Ok(MaintenanceRecord {
            id,
            customer: self.customer,
            vehicle_model: self.vehicle_model,
            oil_type: self.oil_type,
            contact: self.contact,
            last_service: self.last_service,
            interval_days: self.interval_days,
            next_due: due,
            offline_origin: false,
            created_at,
        })
    }
}

impl MaintenanceRecord {
    /// Mark the maintenance as done on `today`: the service date moves to
    /// `today` and the next due date is rederived from it.
    pub fn complete(&mut self, today: NaiveDate) {
        self.last_service = today;
        self.next_due = next_due(today, self.interval_days);
    }

    /// Due today or already past due.
    pub fn is_pending(&self, today: NaiveDate) -> bool {
        self.next_due <= today
    }
}

/// Next due date: `last_service` plus the recurrence interval.
pub fn next_due(last_service: NaiveDate, interval_days: u32) -> NaiveDate {
    last_service
        .checked_add_days(Days::new(u64::from(interval_days)))
        .unwrap_or(NaiveDate::MAX)
}
