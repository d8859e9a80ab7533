//! Seller model - storefront accounts, kept in their own collection.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub store_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Seller {
    pub fn new(store_name: String, email: String, password_hash: String) -> Self {
        let now = DateTime::now();
        Self {
            id: Uuid::new_v4(),
            store_name,
            email,
            password_hash,
            phone: None,
            address: None,
            role: Role::Seller,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sanitized(&self) -> SellerResponse {
        SellerResponse::from(self.clone())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SellerResponse {
    pub id: Uuid,
    pub store_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl From<Seller> for SellerResponse {
    fn from(s: Seller) -> Self {
        Self {
            id: s.id,
            store_name: s.store_name,
            email: s.email,
            phone: s.phone,
            address: s.address,
            role: s.role,
            created_at: s.created_at.to_string(),
        }
    }
}
