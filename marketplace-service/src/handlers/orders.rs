//! Order handlers: creation, the customer and admin views, and the seller's
//! per-item fulfillment updates.
//!
//! The order total is taken from the request body as sent; nothing recomputes
//! it from the item prices. Item status transitions are unguarded, any value
//! can follow any other.

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::{Order, OrderItem, OrderItemStatus, PaymentMethod};
use crate::services::audit::AuditEntry;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    pub seller_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_id: Uuid,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ItemStatusRequest {
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub status: OrderItemStatus,
}

pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest(anyhow!("Order has no items")));
    }

    state
        .shipping
        .find_by_id(payload.shipping_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Shipping address not found")))?;

    let items: Vec<OrderItem> = payload
        .items
        .into_iter()
        .map(|item| OrderItem {
            id: Uuid::new_v4(),
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price,
            seller_id: item.seller_id,
            seller_status: OrderItemStatus::Pending,
        })
        .collect();

    let order = Order::new(
        claims.sub,
        payload.shipping_id,
        payload.total,
        payload.payment_method,
        items,
    );
    state.orders.insert(order.clone()).await?;

    // Stripe orders keep the cart until the webhook confirms payment.
    if payload.payment_method == PaymentMethod::Cod {
        state.carts.clear(claims.sub).await?;
    }

    tracing::info!(order_id = %order.id, user_id = %claims.sub, "Order created");
    state
        .audit
        .record(AuditEntry {
            action: "create",
            entity: "order",
            entity_id: Some(order.id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Created order for {:.2}", order.total),
            ..Default::default()
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Order created", "order": order })),
    ))
}

pub async fn list_user_orders(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_by_user(claims.sub).await?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn get_user_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .filter(|order| order.user_id == claims.sub)
        .ok_or_else(|| AppError::NotFound(anyhow!("Order not found")))?;
    Ok(Json(json!({ "order": order })))
}

pub async fn cancel_user_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CancelOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .orders
        .find_by_id(payload.order_id)
        .await?
        .filter(|order| order.user_id == claims.sub)
        .ok_or_else(|| AppError::NotFound(anyhow!("Order not found")))?;

    if !state.orders.cancel(payload.order_id).await? {
        return Err(AppError::NotFound(anyhow!("Order not found")));
    }

    state
        .audit
        .record(AuditEntry {
            action: "cancel",
            entity: "order",
            entity_id: Some(payload.order_id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: "Cancelled order".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Order cancelled" })))
}

// Seller surface.

pub async fn list_seller_orders(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_by_seller(claims.sub).await?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn update_item_status(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<ItemStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state
        .orders
        .update_item_status(payload.order_id, payload.item_id, claims.sub, payload.status)
        .await?;
    if !updated {
        return Err(AppError::NotFound(anyhow!("Order item not found")));
    }

    state
        .audit
        .record(AuditEntry {
            action: "update_item_status",
            entity: "order",
            entity_id: Some(payload.order_id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: format!("Set item {} status to {:?}", payload.item_id, payload.status),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Item status updated" })))
}

// Admin surface.

pub async fn list_all_orders(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_all().await?;
    Ok(Json(json!({ "orders": orders })))
}

/// Admin lookup keyed by customer, not by order.
pub async fn list_orders_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_by_user(user_id).await?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn admin_cancel_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.orders.cancel(id).await? {
        return Err(AppError::NotFound(anyhow!("Order not found")));
    }

    state
        .audit
        .record(AuditEntry {
            action: "cancel",
            entity: "order",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: "Cancelled order".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Order cancelled" })))
}

pub async fn admin_delete_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.orders.soft_delete(id).await? {
        return Err(AppError::NotFound(anyhow!("Order not found")));
    }

    state
        .audit
        .record(AuditEntry {
            action: "delete",
            entity: "order",
            entity_id: Some(id.to_string()),
            actor_id: Some(claims.sub),
            actor_role: Some(claims.role.as_str()),
            message: "Soft-deleted order".to_string(),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "message": "Order deleted" })))
}
