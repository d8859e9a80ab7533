//! Product model.
//!
//! Products are soft-deleted by flipping `status` to `deleted`; reads filter
//! on status rather than removing documents.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Archived,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub category_id: Uuid,
    pub seller_id: Uuid,
    #[serde(default)]
    pub images: Vec<Uuid>,
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub banner_product: bool,
    #[serde(default)]
    pub is_active: bool,
    pub banner_image: Option<Uuid>,
    pub banner_title: Option<String>,
    pub banner_description: Option<String>,
    pub deleted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Product {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        description: String,
        quantity: i64,
        price: f64,
        category_id: Uuid,
        seller_id: Uuid,
        images: Vec<Uuid>,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            quantity,
            price,
            category_id,
            seller_id,
            images,
            status: ProductStatus::Active,
            featured: false,
            banner_product: false,
            is_active: false,
            banner_image: None,
            banner_title: None,
            banner_description: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
