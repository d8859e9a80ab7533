//! Seller profile handlers.

use anyhow::anyhow;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::{Role, Seller};
use crate::services::audit::AuditEntry;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSellerProfileRequest {
    #[validate(length(min = 2, message = "Store name must be at least 2 characters"))]
    pub store_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let seller = state
        .sellers
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Seller not found")))?;
    Ok(Json(json!({ "seller": seller.sanitized() })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateSellerProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    state
        .sellers
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Seller not found")))?;

    state
        .sellers
        .update_profile(
            claims.sub,
            &payload.store_name,
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    state
        .audit
        .record(AuditEntry {
            action: "update_profile",
            entity: "seller",
            entity_id: Some(claims.sub.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(Role::Seller.as_str()),
            message: "Updated seller profile".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Profile updated" })))
}

pub async fn list_sellers(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sellers = state.sellers.list_all().await?;
    let sellers: Vec<_> = sellers.iter().map(Seller::sanitized).collect();
    Ok(Json(json!({ "sellers": sellers })))
}
