//! Cart handlers. The cart is replaced wholesale on update; the client sends
//! the full desired item list.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::CartItem;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_addition: f64,
    pub seller_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub items: Vec<CartItemRequest>,
}

pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let items = match state.carts.find_by_user(claims.sub).await? {
        Some(cart) => cart.items,
        None => Vec::new(),
    };
    Ok(Json(json!({ "user_id": claims.sub, "items": items })))
}

pub async fn update_cart(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateCartRequest>,
) -> Result<impl IntoResponse, AppError> {
    let items: Vec<CartItem> = payload
        .items
        .into_iter()
        .map(|item| CartItem {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price_at_addition: item.price_at_addition,
            seller_id: item.seller_id,
        })
        .collect();

    state.carts.upsert_items(claims.sub, &items).await?;
    Ok(Json(json!({ "message": "Cart updated", "items": items })))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    state.carts.clear(claims.sub).await?;
    Ok(Json(json!({ "message": "Cart cleared" })))
}
