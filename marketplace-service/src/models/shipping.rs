use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub region: String,
    pub city: String,
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}
