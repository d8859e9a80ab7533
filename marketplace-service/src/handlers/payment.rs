//! Stripe payment handlers: hosted Checkout Session creation and the
//! signature-verified webhook that settles orders.

use anyhow::anyhow;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::{PaymentMethod, PaymentStatus};
use crate::services::audit::AuditEntry;
use crate::services::stripe::{CompletedSession, LineItem};
use crate::AppState;

pub const SHIPPING_FEE_CENTS: i64 = 10_00;
pub const VAT_RATE: f64 = 0.13;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: Uuid,
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .orders
        .find_by_id(payload.order_id)
        .await?
        .filter(|order| order.user_id == claims.sub)
        .ok_or_else(|| AppError::NotFound(anyhow!("Order not found")))?;

    if order.payment.method != Some(PaymentMethod::Stripe) {
        return Err(AppError::BadRequest(anyhow!(
            "Order is not payable through Stripe"
        )));
    }
    if order.payment.status == PaymentStatus::Paid {
        return Err(AppError::BadRequest(anyhow!("Order is already paid")));
    }

    let mut line_items: Vec<LineItem> = order
        .items
        .iter()
        .map(|item| LineItem {
            name: item.product_name.clone(),
            unit_amount_cents: to_cents(item.price),
            quantity: item.quantity,
        })
        .collect();

    let subtotal: f64 = order
        .items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();

    line_items.push(LineItem {
        name: "Shipping".to_string(),
        unit_amount_cents: SHIPPING_FEE_CENTS,
        quantity: 1,
    });
    line_items.push(LineItem {
        name: "VAT (13%)".to_string(),
        unit_amount_cents: to_cents(subtotal * VAT_RATE),
        quantity: 1,
    });

    let success_url = format!("{}/checkout/success", state.config.frontend_url);
    let cancel_url = format!("{}/checkout/cancel", state.config.frontend_url);

    let session = state
        .stripe
        .create_checkout_session(
            &line_items,
            &claims.sub.to_string(),
            &order.id.to_string(),
            &success_url,
            &cancel_url,
        )
        .await
        .map_err(AppError::InternalError)?;

    Ok(Json(json!({ "url": session.url, "session_id": session.id })))
}

/// Stripe webhook endpoint. The body must stay raw; signature verification
/// runs over the exact bytes Stripe sent.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(anyhow!("Missing Stripe-Signature header")))?;

    let verified = state
        .stripe
        .verify_webhook_signature(&body, signature)
        .unwrap_or(false);
    if !verified {
        tracing::warn!(
            signature_preview = %signature.chars().take(24).collect::<String>(),
            secret_preview = %state.stripe.webhook_secret_preview(),
            "Webhook signature verification failed"
        );
        return Err(AppError::BadRequest(anyhow!("Invalid webhook signature")));
    }

    let event = state
        .stripe
        .parse_webhook_event(&body)
        .map_err(|e| AppError::BadRequest(anyhow!("Malformed webhook payload: {}", e)))?;

    if event.event_type != "checkout.session.completed" {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
        return Ok(Json(json!({ "received": true })));
    }

    let session: CompletedSession = serde_json::from_value(event.data.object)
        .map_err(|e| AppError::BadRequest(anyhow!("Malformed session object: {}", e)))?;

    let metadata = session
        .metadata
        .ok_or_else(|| AppError::BadRequest(anyhow!("Session has no metadata")))?;
    let user_id: Uuid = metadata
        .user_id
        .as_deref()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| AppError::BadRequest(anyhow!("Session metadata has no user id")))?;
    let order_id: Uuid = metadata
        .order_id
        .as_deref()
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| AppError::BadRequest(anyhow!("Session metadata has no order id")))?;

    let intent_id = session
        .payment_intent
        .ok_or_else(|| AppError::BadRequest(anyhow!("Session has no payment intent")))?;
    let intent = state
        .stripe
        .get_payment_intent(&intent_id)
        .await
        .map_err(AppError::InternalError)?;

    let receipt_url = match intent.latest_charge {
        Some(ref charge_id) => state
            .stripe
            .get_charge(charge_id)
            .await
            .map_err(AppError::InternalError)?
            .receipt_url,
        None => None,
    };

    let amount_paid = intent.amount as f64 / 100.0;
    let marked = state
        .orders
        .mark_paid(order_id, amount_paid, &intent.id, receipt_url.as_deref())
        .await?;
    if !marked {
        return Err(AppError::BadRequest(anyhow!(
            "Order {} not found for completed session",
            order_id
        )));
    }

    state.carts.clear(user_id).await?;

    tracing::info!(order_id = %order_id, amount_paid, "Order settled by webhook");
    state
        .audit
        .record(AuditEntry {
            action: "payment_completed",
            entity: "order",
            entity_id: Some(order_id.to_string()),
            actor_id: Some(user_id),
            message: format!("Payment of {:.2} confirmed by Stripe webhook", amount_paid),
            ..Default::default()
        })
        .await;

    Ok(Json(json!({ "received": true })))
}
