use axum::Router;

pub mod items;
pub mod system;

/// Router for the inventory endpoints.
pub fn router() -> Router {
    Router::new().nest("/items", items::router())
}
