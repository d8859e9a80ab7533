//! Order model.
//!
//! Item-level `seller_status` values are mutated independently of the
//! order-level `status`; nothing reconciles the two.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order-level fulfillment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "Partially Shipped")]
    PartiallyShipped,
    Shipped,
    #[serde(rename = "Partially Delivered")]
    PartiallyDelivered,
    Delivered,
    Cancelled,
}

/// Per-item fulfillment status, owned by the item's seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderItemStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Stripe,
    Cod,
}

/// Payment sub-document embedded in the order and mutated in place by the
/// webhook handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    pub method: Option<PaymentMethod>,
    pub amount_paid: Option<f64>,
    pub payment_id: Option<String>,
    pub payment_date: Option<DateTime>,
    pub receipt_url: Option<String>,
}

impl PaymentInfo {
    pub fn pending(method: PaymentMethod) -> Self {
        Self {
            status: PaymentStatus::Pending,
            method: Some(method),
            amount_paid: None,
            payment_id: None,
            payment_date: None,
            receipt_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    pub seller_id: Uuid,
    pub seller_status: OrderItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_id: Uuid,
    pub total: f64,
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub items: Vec<OrderItem>,
    pub cancelled_at: Option<DateTime>,
    #[serde(default)]
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Per-seller projection of an order, produced by the seller aggregation.
/// `total` here is recomputed from the seller's own items only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerOrder {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_id: Uuid,
    pub total: f64,
    pub status: OrderStatus,
    pub payment: PaymentInfo,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        shipping_id: Uuid,
        total: f64,
        method: PaymentMethod,
        items: Vec<OrderItem>,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            shipping_id,
            total,
            status: OrderStatus::Pending,
            payment: PaymentInfo::pending(method),
            items,
            cancelled_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
