use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::StoreError;

pub const ITEM_NOT_FOUND: &str = "Item not found";

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_detail(StatusCode::NOT_FOUND, ITEM_NOT_FOUND),
        StoreError::Database(e) => {
            tracing::error!(error = %e, "inventory store failure");
            json_detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({ "detail": fields })),
        )
            .into_response(),
    }
}

pub fn json_detail(status: StatusCode, detail: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "detail": detail.into() }))).into_response()
}
