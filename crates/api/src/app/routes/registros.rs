use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use oficina_core::RecordId;

use crate::app::{dto, errors};
use crate::app::store::ShopStore;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route(
            "/:id",
            axum::routing::put(complete_record).delete(delete_record),
        )
}

pub async fn list_records(Extension(store): Extension<Arc<ShopStore>>) -> axum::response::Response {
    (StatusCode::OK, Json(store.records().await)).into_response()
}

/// Records due today or earlier (mounted at `/pendentes`).
pub async fn list_pending(Extension(store): Extension<Arc<ShopStore>>) -> axum::response::Response {
    let today = Utc::now().date_naive();
    (StatusCode::OK, Json(store.pending_records(today).await)).into_response()
}

pub async fn create_record(
    Extension(store): Extension<Arc<ShopStore>>,
    Json(body): Json<dto::CreateRecordRequest>,
) -> axum::response::Response {
    let new = match body.into_domain() {
        Ok(new) => new,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let record = match new.into_record(RecordId::generate(), Utc::now()) {
        Ok(record) => record,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = store.insert_record(record.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(record)).into_response()
}

/// Mark-complete: rebase the schedule on today's date.
pub async fn complete_record(
    Extension(store): Extension<Arc<ShopStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id"),
    };

    let today = Utc::now().date_naive();
    match store.complete_record(id, today).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_record(
    Extension(store): Extension<Arc<ShopStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RecordId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id"),
    };

    match store.remove_record(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "record not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
