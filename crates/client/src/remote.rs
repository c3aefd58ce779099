//! Remote procedure boundary to the REST API.
//!
//! The sync core treats the server purely as a set of calls that may fail;
//! its only reaction to a failure is to leave the mismatched queue entry in
//! place. No retry, no backoff, no per-call timeout: a call is awaited to
//! completion or failure.

use std::future::Future;

use thiserror::Error;

use oficina_core::{RecordId, WarrantyId};
use oficina_maintenance::{MaintenanceRecord, NewMaintenanceRecord};
use oficina_warranty::{NewWarranty, WarrantyRecord};

use crate::types::QueuedAction;

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Status(u16, String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Calls the client issues against the authoritative store.
///
/// One method per operation so tests can substitute a scripted double; the
/// sync engine is generic over this trait rather than boxing it.
pub trait RemoteApi {
    fn create_record(
        &self,
        new: &NewMaintenanceRecord,
    ) -> impl Future<Output = Result<MaintenanceRecord, RemoteError>> + Send;

    fn complete_record(
        &self,
        id: RecordId,
    ) -> impl Future<Output = Result<MaintenanceRecord, RemoteError>> + Send;

    fn delete_record(&self, id: RecordId) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn create_warranty(
        &self,
        new: &NewWarranty,
    ) -> impl Future<Output = Result<WarrantyRecord, RemoteError>> + Send;

    fn delete_warranty(
        &self,
        id: WarrantyId,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn fetch_records(
        &self,
    ) -> impl Future<Output = Result<Vec<MaintenanceRecord>, RemoteError>> + Send;

    fn fetch_warranties(
        &self,
    ) -> impl Future<Output = Result<Vec<WarrantyRecord>, RemoteError>> + Send;
}

/// Replay one queued action against the remote store.
///
/// Ordering and halt-on-failure are the engine's concern; this just issues
/// the matching call and discards any returned entity.
pub async fn apply<R: RemoteApi + Sync>(
    remote: &R,
    action: &QueuedAction,
) -> Result<(), RemoteError> {
    match action {
        QueuedAction::CreateRecord(new) => remote.create_record(new).await.map(drop),
        QueuedAction::UpdateRecord { id } => remote.complete_record(*id).await.map(drop),
        QueuedAction::DeleteRecord { id } => remote.delete_record(*id).await,
        QueuedAction::CreateWarranty(new) => remote.create_warranty(new).await.map(drop),
        QueuedAction::DeleteWarranty { id } => remote.delete_warranty(*id).await,
    }
}

/// `RemoteApi` over HTTP against the REST server.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the health endpoint; used to seed the connectivity monitor's
    /// initial state.
    pub async fn check_connectivity(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        self.client.get(&url).send().await.is_ok()
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let resp = req
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(RemoteError::Status(status, body))
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, RemoteError> {
        resp.json().await.map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

impl RemoteApi for HttpRemote {
    async fn create_record(
        &self,
        new: &NewMaintenanceRecord,
    ) -> Result<MaintenanceRecord, RemoteError> {
        let url = format!("{}/registros", self.base_url);
        let resp = self.send(self.client.post(&url).json(new)).await?;
        Self::decode(resp).await
    }

    async fn complete_record(&self, id: RecordId) -> Result<MaintenanceRecord, RemoteError> {
        let url = format!("{}/registros/{}", self.base_url, id);
        let resp = self.send(self.client.put(&url)).await?;
        Self::decode(resp).await
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), RemoteError> {
        let url = format!("{}/registros/{}", self.base_url, id);
        self.send(self.client.delete(&url)).await.map(drop)
    }

    async fn create_warranty(&self, new: &NewWarranty) -> Result<WarrantyRecord, RemoteError> {
        let url = format!("{}/garantias", self.base_url);
        let resp = self.send(self.client.post(&url).json(new)).await?;
        Self::decode(resp).await
    }

    async fn delete_warranty(&self, id: WarrantyId) -> Result<(), RemoteError> {
        let url = format!("{}/garantias/{}", self.base_url, id);
        self.send(self.client.delete(&url)).await.map(drop)
    }

    async fn fetch_records(&self) -> Result<Vec<MaintenanceRecord>, RemoteError> {
        let url = format!("{}/registros", self.base_url);
        let resp = self.send(self.client.get(&url)).await?;
        Self::decode(resp).await
    }

    async fn fetch_warranties(&self) -> Result<Vec<WarrantyRecord>, RemoteError> {
        let url = format!("{}/garantias", self.base_url);
        let resp = self.send(self.client.get(&url)).await?;
        Self::decode(resp).await
    }
}
