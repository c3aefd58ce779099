//! Scripted remote double shared by the engine, monitor, and facade tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use oficina_core::{RecordId, WarrantyId};
use oficina_maintenance::{MaintenanceRecord, NewMaintenanceRecord};
use oficina_warranty::{NewWarranty, WarrantyRecord};

use crate::remote::{RemoteApi, RemoteError};

pub(crate) fn fixture_new_record() -> NewMaintenanceRecord {
    NewMaintenanceRecord {
        customer: "Ana Souza".to_string(),
        vehicle_model: "CG 160".to_string(),
        oil_type: "10W30".to_string(),
        contact: "(11) 99999-0000".to_string(),
        last_service: "2026-01-01".parse().unwrap(),
        interval_days: 30,
    }
}

pub(crate) fn fixture_record(id: i64) -> MaintenanceRecord {
    fixture_new_record()
        .into_record(
            RecordId::from_millis(id),
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        )
        .unwrap()
}

pub(crate) fn fixture_new_warranty() -> NewWarranty {
    NewWarranty {
        customer: "Carlos Lima".to_string(),
        service_type: "Troca de embreagem".to_string(),
        description: None,
        value_cents: 35_000,
        service_date: "2026-01-15".parse().unwrap(),
        warranty_months: 3,
        phone: None,
    }
}

pub(crate) fn fixture_warranty(id: i64) -> WarrantyRecord {
    fixture_new_warranty()
        .into_record(
            WarrantyId::from_millis(id),
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        )
        .unwrap()
}

/// Remote double driven by a script: mutation calls are numbered from 1 and
/// fail when their number is in the failure set; an optional gate makes
/// every mutation wait for a semaphore permit first.
pub(crate) struct ScriptedRemote {
    mutation_calls: AtomicUsize,
    fetch_records_calls: AtomicUsize,
    fail_calls: HashSet<usize>,
    gate: Option<Arc<Semaphore>>,
    applied: Mutex<Vec<&'static str>>,
    records: Mutex<Vec<MaintenanceRecord>>,
    warranties: Mutex<Vec<WarrantyRecord>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::with_script(HashSet::new(), None)
    }

    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self::with_script(calls.into_iter().collect(), None)
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self::with_script(HashSet::new(), Some(gate))
    }

    fn with_script(fail_calls: HashSet<usize>, gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            mutation_calls: AtomicUsize::new(0),
            fetch_records_calls: AtomicUsize::new(0),
            fail_calls,
            gate,
            applied: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
            warranties: Mutex::new(Vec::new()),
        }
    }

    /// What `fetch_records` should return.
    pub fn set_records(&self, records: Vec<MaintenanceRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn set_warranties(&self, warranties: Vec<WarrantyRecord>) {
        *self.warranties.lock().unwrap() = warranties;
    }

    /// Number of mutation calls issued so far.
    pub fn mutation_count(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_records` calls, i.e. cache refreshes started.
    pub fn fetch_count(&self) -> usize {
        self.fetch_records_calls.load(Ordering::SeqCst)
    }

    /// Kind labels of the mutations that succeeded, in call order.
    pub fn applied_kinds(&self) -> Vec<&'static str> {
        self.applied.lock().unwrap().clone()
    }

    async fn mutation(&self, label: &'static str) -> Result<(), RemoteError> {
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.unwrap();
            permit.forget();
        }
        let seq = self.mutation_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.contains(&seq) {
            return Err(RemoteError::Network("scripted failure".to_string()));
        }
        self.applied.lock().unwrap().push(label);
        Ok(())
    }
}

impl RemoteApi for ScriptedRemote {
    async fn create_record(
        &self,
        new: &NewMaintenanceRecord,
    ) -> Result<MaintenanceRecord, RemoteError> {
        self.mutation("create_record").await?;
        Ok(new
            .clone()
            .into_record(
                RecordId::from_millis(900),
                Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
            )
            .unwrap())
    }

    async fn complete_record(&self, id: RecordId) -> Result<MaintenanceRecord, RemoteError> {
        self.mutation("update_record").await?;
        Ok(fixture_record(id.as_millis()))
    }

    async fn delete_record(&self, _id: RecordId) -> Result<(), RemoteError> {
        self.mutation("delete_record").await
    }

    async fn create_warranty(&self, new: &NewWarranty) -> Result<WarrantyRecord, RemoteError> {
        self.mutation("create_warranty").await?;
        Ok(new
            .clone()
            .into_record(
                WarrantyId::from_millis(901),
                Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
            )
            .unwrap())
    }

    async fn delete_warranty(&self, _id: WarrantyId) -> Result<(), RemoteError> {
        self.mutation("delete_warranty").await
    }

    async fn fetch_records(&self) -> Result<Vec<MaintenanceRecord>, RemoteError> {
        self.fetch_records_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().clone())
    }

    async fn fetch_warranties(&self) -> Result<Vec<WarrantyRecord>, RemoteError> {
        Ok(self.warranties.lock().unwrap().clone())
    }
}
