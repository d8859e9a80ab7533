use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line item in a cart; name and price are snapshots taken at add-time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub price_at_addition: f64,
    pub seller_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
