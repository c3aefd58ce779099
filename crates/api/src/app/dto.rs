//! Request DTOs.
//!
//! Creation bodies arrive with every field optional so that a missing
//! required field surfaces as our own validation error (HTTP 400) rather
//! than a deserialization rejection. `into_domain` performs the
//! required-field check; value-level validation stays in the domain crates.

use chrono::NaiveDate;
use serde::Deserialize;

use oficina_core::{DomainError, DomainResult};
use oficina_maintenance::NewMaintenanceRecord;
use oficina_warranty::NewWarranty;

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub customer: Option<String>,
    pub vehicle_model: Option<String>,
    pub oil_type: Option<String>,
    pub contact: Option<String>,
    pub last_service: Option<NaiveDate>,
    pub interval_days: Option<u32>,
}

impl CreateRecordRequest {
    pub fn into_domain(self) -> DomainResult<NewMaintenanceRecord> {
        Ok(NewMaintenanceRecord {
            customer: require(self.customer, "customer")?,
            vehicle_model: require(self.vehicle_model, "vehicle_model")?,
            oil_type: require(self.oil_type, "oil_type")?,
            contact: require(self.contact, "contact")?,
            last_service: self
                .last_service
                .ok_or_else(|| missing("last_service"))?,
            interval_days: self
                .interval_days
                .ok_or_else(|| missing("interval_days"))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWarrantyRequest {
    pub customer: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub value_cents: Option<u64>,
    pub service_date: Option<NaiveDate>,
    pub warranty_months: Option<u32>,
    pub phone: Option<String>,
}

impl CreateWarrantyRequest {
    pub fn into_domain(self) -> DomainResult<NewWarranty> {
        Ok(NewWarranty {
            customer: require(self.customer, "customer")?,
            service_type: require(self.service_type, "service_type")?,
            description: self.description,
            value_cents: self.value_cents.ok_or_else(|| missing("value_cents"))?,
            service_date: self
                .service_date
                .ok_or_else(|| missing("service_date"))?,
            warranty_months: self
                .warranty_months
                .ok_or_else(|| missing("warranty_months"))?,
            phone: self.phone,
        })
    }
}

fn require(field: Option<String>, name: &str) -> DomainResult<String> {
    field.ok_or_else(|| missing(name))
}

fn missing(name: &str) -> DomainError {
    DomainError::validation(format!("{name} is required"))
}
