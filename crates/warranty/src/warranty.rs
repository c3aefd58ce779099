use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use oficina_core::{DomainError, DomainResult, WarrantyId};

/// A warranty issued for one completed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarrantyRecord {
    pub id: WarrantyId,
    pub customer: String,
    pub service_type: String,
    pub description: Option<String>,
    /// Monetary value in centavos.
    pub value_cents: u64,
    pub service_date: NaiveDate,
    pub warranty_months: u32,
    /// Derived: `service_date + warranty_months` calendar months (end-of-month
    /// clamped). Recomputed on every change to `service_date` or
    /// `warranty_months`, never edited directly.
    pub expiry: NaiveDate,
    pub phone: Option<String>,
    /// Created locally while offline and not yet confirmed by the server.
    #[serde(default)]
    pub offline_origin: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a warranty. The identifier and the derived fields are
/// assigned at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWarranty {
    pub customer: String,
    pub service_type: String,
    pub description: Option<String>,
    pub value_cents: u64,
    pub service_date: NaiveDate,
    pub warranty_months: u32,
    pub phone: Option<String>,
}

impl NewWarranty {
    pub fn validate(&self) -> DomainResult<()> {
        if self.customer.trim().is_empty() {
            return Err(DomainError::validation("customer is required"));
        }
        if self.service_type.trim().is_empty() {
            return Err(DomainError::validation("service_type is required"));
        }
        if self.warranty_months == 0 {
            return Err(DomainError::validation("warranty_months must be at least 1"));
        }
        Ok(())
    }

    /// Materialize the warranty under the given identifier and creation
    /// instant, deriving `expiry`.
    pub fn into_record(
        self,
        id: WarrantyId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<WarrantyRecord> {
        self.validate()?;
        let expiry = expiry(self.service_date, self.warranty_months);
        Ok(WarrantyRecord {
            id,
            customer: self.customer,
            service_type: self.service_type,
            description: self.description,
            value_cents: self.value_cents,
            service_date: self.service_date,
            warranty_months: self.warranty_months,
            expiry,
            phone: self.phone,
            offline_origin: false,
            created_at,
        })
    }
}

/// Partial update; absent fields keep their current value. The expiry date
/// is not part of the update surface; it is rederived whenever the service
/// date or the duration changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WarrantyUpdate {
    pub customer: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub value_cents: Option<u64>,
    pub service_date: Option<NaiveDate>,
    pub warranty_months: Option<u32>,
    pub phone: Option<String>,
}

impl WarrantyRecord {
    pub fn apply_update(&mut self, update: WarrantyUpdate) -> DomainResult<()> {
        if let Some(customer) = update.customer {
            if customer.trim().is_empty() {
                return Err(DomainError::validation("customer must not be blank"));
            }
            self.customer = customer;
        }
        if let Some(service_type) = update.service_type {
            if service_type.trim().is_empty() {
                return Err(DomainError::validation("service_type must not be blank"));
            }
            self.service_type = service_type;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(value_cents) = update.value_cents {
            self.value_cents = value_cents;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }

        let mut rederive = false;
        if let Some(service_date) = update.service_date {
            self.service_date = service_date;
            rederive = true;
        }
        if let Some(months) = update.warranty_months {
            if months == 0 {
                return Err(DomainError::validation("warranty_months must be at least 1"));
            }
            self.warranty_months = months;
            rederive = true;
        }
        if rederive {
            self.expiry = expiry(self.service_date, self.warranty_months);
        }
        Ok(())
    }

    /// Not yet expired as of `today` (expiring today still counts).
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.expiry >= today
    }
}

/// Expiry date: `service_date` plus the warranty duration in calendar
/// months, clamped to the end of the target month.
pub fn expiry(service_date: NaiveDate, warranty_months: u32) -> NaiveDate {
    service_date
        .checked_add_months(Months::new(warranty_months))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn new_warranty() -> NewWarranty {
        NewWarranty {
            customer: "Carlos Lima".to_string(),
            service_type: "Troca de embreagem".to_string(),
            description: Some("Kit completo".to_string()),
            value_cents: 35_000,
            service_date: d("2026-01-15"),
            warranty_months: 3,
            phone: Some("(69) 98888-1111".to_string()),
        }
    }

    #[test]
    fn derives_expiry_from_service_date_and_months() {
        let warranty = new_warranty()
            .into_record(WarrantyId::from_millis(1), Utc::now())
            .unwrap();
        assert_eq!(warranty.expiry, d("2026-04-15"));
    }

    #[test]
    fn month_addition_clamps_to_end_of_month() {
        assert_eq!(expiry(d("2026-01-31"), 1), d("2026-02-28"));
        assert_eq!(expiry(d("2026-08-31"), 1), d("2026-09-30"));
    }

    #[test]
    fn update_rederives_expiry_when_duration_changes() {
        let mut warranty = new_warranty()
            .into_record(WarrantyId::from_millis(1), Utc::now())
            .unwrap();

        warranty
            .apply_update(WarrantyUpdate {
                warranty_months: Some(6),
                ..WarrantyUpdate::default()
            })
            .unwrap();

        assert_eq!(warranty.warranty_months, 6);
        assert_eq!(warranty.expiry, d("2026-07-15"));
    }

    #[test]
    fn update_without_date_fields_keeps_expiry() {
        let mut warranty = new_warranty()
            .into_record(WarrantyId::from_millis(1), Utc::now())
            .unwrap();
        let before = warranty.expiry;

        warranty
            .apply_update(WarrantyUpdate {
                customer: Some("Carlos A. Lima".to_string()),
                value_cents: Some(40_000),
                ..WarrantyUpdate::default()
            })
            .unwrap();

        assert_eq!(warranty.expiry, before);
    }

    #[test]
    fn blank_update_fields_are_rejected() {
        let mut warranty = new_warranty()
            .into_record(WarrantyId::from_millis(1), Utc::now())
            .unwrap();

        let err = warranty
            .apply_update(WarrantyUpdate {
                customer: Some("  ".to_string()),
                ..WarrantyUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn active_includes_the_expiry_date_itself() {
        let warranty = new_warranty()
            .into_record(WarrantyId::from_millis(1), Utc::now())
            .unwrap();

        assert!(warranty.is_active(d("2026-04-15")));
        assert!(!warranty.is_active(d("2026-04-16")));
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let mut new = new_warranty();
        new.service_type = String::new();
        assert!(new.validate().is_err());

        let mut new = new_warranty();
        new.warranty_months = 0;
        assert!(new.validate().is_err());
    }
}
