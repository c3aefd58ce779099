//! HTTP API application wiring (Axum router + store wiring).
//!
//! If you're new to Rust, this folder is structured like:
//! - `store.rs`: flat-file persistence
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and required-field checks
//! - `errors.rs`: consistent error responses
//! - `pdf.rs`: warranty certificate rendering

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Extension, Router};

pub mod dto;
pub mod errors;
pub mod pdf;
pub mod routes;
pub mod store;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(data_file: PathBuf) -> anyhow::Result<Router> {
    let store = Arc::new(store::ShopStore::open(data_file).await?);

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(store)))
}
