pub mod auth;
pub mod carts;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod payment;
pub mod products;
pub mod sellers;
pub mod shipping;
pub mod users;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "marketplace-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
