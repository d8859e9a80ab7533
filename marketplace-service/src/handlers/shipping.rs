//! Shipping address handlers; addresses are owned by the customer on the
//! session token.

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mongodb::bson::DateTime;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::ShippingAddress;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ShippingAddressRequest {
    #[validate(length(min = 3, message = "Full name must be at least 3 characters"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 10, message = "Phone must be at least 10 characters"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Region is required"))]
    pub region: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
}

pub async fn list_addresses(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let addresses = state.shipping.list_by_customer(claims.sub).await?;
    Ok(Json(json!({ "addresses": addresses })))
}

pub async fn get_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let address = owned_address(&state, id, claims.sub).await?;
    Ok(Json(json!({ "address": address })))
}

pub async fn create_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ShippingAddressRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let now = DateTime::now();
    let address = ShippingAddress {
        id: Uuid::new_v4(),
        customer_id: claims.sub,
        full_name: payload.full_name,
        email: payload.email,
        phone: payload.phone,
        region: payload.region,
        city: payload.city,
        address: payload.address,
        is_default: payload.is_default,
        created_at: now,
        updated_at: now,
    };
    state.shipping.insert(address.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Address created", "address": address })),
    ))
}

pub async fn update_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingAddressRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = owned_address(&state, id, claims.sub).await?;
    let updated = ShippingAddress {
        id,
        customer_id: claims.sub,
        full_name: payload.full_name,
        email: payload.email,
        phone: payload.phone,
        region: payload.region,
        city: payload.city,
        address: payload.address,
        is_default: payload.is_default,
        created_at: existing.created_at,
        updated_at: DateTime::now(),
    };
    state.shipping.update(id, &updated).await?;

    Ok(Json(json!({ "message": "Address updated", "address": updated })))
}

pub async fn delete_address(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    owned_address(&state, id, claims.sub).await?;
    state.shipping.delete_by_id(id).await?;
    Ok(Json(json!({ "message": "Address deleted" })))
}

async fn owned_address(
    state: &AppState,
    id: Uuid,
    customer_id: Uuid,
) -> Result<ShippingAddress, AppError> {
    let address = state
        .shipping
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Address not found")))?;
    if address.customer_id != customer_id {
        return Err(AppError::NotFound(anyhow!("Address not found")));
    }
    Ok(address)
}
