use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use oficina_core::WarrantyId;
use oficina_warranty::WarrantyUpdate;

use crate::app::store::ShopStore;
use crate::app::{dto, errors, pdf};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_warranties).post(create_warranty))
        .route("/ativas", get(list_active))
        .route(
            "/:id",
            axum::routing::put(update_warranty).delete(delete_warranty),
        )
        .route("/:id/pdf", get(warranty_pdf))
}

pub async fn list_warranties(
    Extension(store): Extension<Arc<ShopStore>>,
) -> axum::response::Response {
    (StatusCode::OK, Json(store.warranties().await)).into_response()
}

/// Warranties not yet expired as of today.
pub async fn list_active(Extension(store): Extension<Arc<ShopStore>>) -> axum::response::Response {
    let today = Utc::now().date_naive();
    (StatusCode::OK, Json(store.active_warranties(today).await)).into_response()
}

pub async fn create_warranty(
    Extension(store): Extension<Arc<ShopStore>>,
    Json(body): Json<dto::CreateWarrantyRequest>,
) -> axum::response::Response {
    let new = match body.into_domain() {
        Ok(new) => new,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let warranty = match new.into_record(WarrantyId::generate(), Utc::now()) {
        Ok(warranty) => warranty,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = store.insert_warranty(warranty.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(warranty)).into_response()
}

/// Partial update. The expiry date never appears in the update surface; it
/// is rederived inside the domain whenever the service date or duration
/// changes.
pub async fn update_warranty(
    Extension(store): Extension<Arc<ShopStore>>,
    Path(id): Path<String>,
    Json(update): Json<WarrantyUpdate>,
) -> axum::response::Response {
    let id: WarrantyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warranty id")
        }
    };

    match store.update_warranty(id, |w| w.apply_update(update)).await {
        Ok(Some(Ok(warranty))) => (StatusCode::OK, Json(warranty)).into_response(),
        Ok(Some(Err(e))) => errors::domain_error_to_response(e),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "warranty not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_warranty(
    Extension(store): Extension<Arc<ShopStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarrantyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warranty id")
        }
    };

    match store.remove_warranty(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "warranty not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Certificate download (`application/pdf`, attachment).
pub async fn warranty_pdf(
    Extension(store): Extension<Arc<ShopStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarrantyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warranty id")
        }
    };

    let Some(warranty) = store.get_warranty(id).await else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warranty not found");
    };

    match pdf::render_certificate(&warranty, Utc::now().date_naive()) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"garantia_{}.pdf\"", warranty.id),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(%err, warranty = %warranty.id, "failed to render certificate");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "pdf_error",
                "failed to render certificate",
            )
        }
    }
}
