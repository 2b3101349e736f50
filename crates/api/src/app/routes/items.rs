use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;

use stockroom_core::{DomainError, FieldError};

use crate::app::services::AppServices;
use crate::app::dto::{self, QuantityField, QuantityParams};
use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item).delete(delete_all_items))
        .route(
            "/:item",
            delete(delete_item).patch(adjust_quantity).put(set_quantity),
        )
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.list_items().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> axum::response::Response {
    let record = match dto::parse_create_item(&body) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.save_item(&record).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(json!({ "status": "saved" }))).into_response()
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(item): Path<String>,
) -> axum::response::Response {
    if let Err(e) = services.delete_item(&item).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(json!({ "status": "deleted" }))).into_response()
}

pub async fn adjust_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(item): Path<String>,
    query: Result<Query<QuantityParams>, QueryRejection>,
    body: Bytes,
) -> axum::response::Response {
    let change = match quantity_param(QuantityField::Change, query, &body) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.adjust_quantity(&item, change).await {
        Ok(new_quantity) => updated(item, new_quantity),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(item): Path<String>,
    query: Result<Query<QuantityParams>, QueryRejection>,
    body: Bytes,
) -> axum::response::Response {
    let new_quantity = match quantity_param(QuantityField::NewQuantity, query, &body) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.set_quantity(&item, new_quantity).await {
        Ok(new_quantity) => updated(item, new_quantity),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_all_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.delete_all_items().await {
        Ok(removed) => {
            tracing::info!(removed, "all inventory deleted");
            (StatusCode::OK, Json(json!({ "status": "all_deleted" }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

fn quantity_param(
    field: QuantityField,
    query: Result<Query<QuantityParams>, QueryRejection>,
    body: &[u8],
) -> Result<i64, DomainError> {
    let Query(params) = query.map_err(|e| {
        DomainError::invalid_field(FieldError::new(["query"], e.body_text(), "query_invalid"))
    })?;
    dto::int_param(field, &params, body)
}

fn updated(item: String, new_quantity: i64) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "updated",
            "item": item,
            "new_quantity": new_quantity,
        })),
    )
        .into_response()
}
