use axum::{routing::get, Router};

pub mod garantias;
pub mod registros;
pub mod system;

/// Router for the shop endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/pendentes", get(registros::list_pending))
        .nest("/registros", registros::router())
        .nest("/garantias", garantias::router())
}
