use crate::models::{Product, ProductStatus};
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use serde::Deserialize;
use uuid::Uuid;

use super::categories::regex_escape;

/// Catalog listing filters; all fields optional.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
}

/// Result of the price-range aggregation.
#[derive(Debug, serde::Serialize, Deserialize)]
pub struct PriceRange {
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Clone)]
pub struct ProductRepository {
    collection: Collection<Product>,
}

impl ProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("products"),
        }
    }

    fn not_deleted() -> Document {
        doc! { "status": { "$nin": ["deleted"] } }
    }

    fn listable() -> Document {
        doc! { "status": { "$nin": ["deleted", "archived"] } }
    }

    pub async fn list_all(&self, limit: Option<i64>) -> Result<Vec<Product>> {
        let options = FindOptions::builder().limit(limit).build();
        let cursor = self.collection.find(Self::not_deleted(), options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_banners(&self) -> Result<Vec<Product>> {
        let mut filter = Self::not_deleted();
        filter.insert("is_active", true);
        filter.insert("banner_product", true);
        let cursor = self.collection.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_newest(&self, limit: Option<i64>) -> Result<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .build();
        let cursor = self.collection.find(Self::listable(), options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_featured(&self) -> Result<Vec<Product>> {
        let mut filter = Self::listable();
        filter.insert("featured", true);
        let cursor = self.collection.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Product>> {
        let mut filter = Self::listable();
        filter.insert("name", doc! { "$regex": regex_escape(query), "$options": "i" });
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(20)
            .build();
        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_filtered(&self, params: &ProductFilter) -> Result<Vec<Product>> {
        let mut filter = Self::listable();

        if let Some(category_id) = params.category_id {
            filter.insert("category_id", category_id.to_string());
        }
        if params.min_price.is_some() || params.max_price.is_some() {
            let mut price = Document::new();
            if let Some(min) = params.min_price {
                price.insert("$gte", min);
            }
            if let Some(max) = params.max_price {
                price.insert("$lte", max);
            }
            filter.insert("price", price);
        }

        let sort = match params.sort.as_deref() {
            Some("price-high-low") => doc! { "price": -1 },
            Some("price-low-high") => doc! { "price": 1 },
            Some("name-a-z") => doc! { "name": 1 },
            Some("name-z-a") => doc! { "name": -1 },
            _ => doc! { "created_at": -1 },
        };

        let options = FindOptions::builder().sort(sort).build();
        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn price_range(&self, category_id: Option<Uuid>) -> Result<PriceRange> {
        let mut match_stage = Self::listable();
        if let Some(category_id) = category_id {
            match_stage.insert("category_id", category_id.to_string());
        }

        let pipeline = vec![
            doc! { "$match": match_stage },
            doc! { "$group": {
                "_id": null,
                "min_price": { "$min": "$price" },
                "max_price": { "$max": "$price" },
            }},
        ];

        let mut cursor = self.collection.aggregate(pipeline, None).await?;
        if let Some(result) = cursor.try_next().await? {
            Ok(PriceRange {
                min_price: result.get_f64("min_price").unwrap_or(0.0),
                max_price: result.get_f64("max_price").unwrap_or(0.0),
            })
        } else {
            Ok(PriceRange {
                min_price: 0.0,
                max_price: 0.0,
            })
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let filter = doc! {
            "_id": id.to_string(),
            "status": { "$ne": "deleted" }
        };
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Product>> {
        let filter = doc! {
            "name": { "$regex": format!("^{}$", regex_escape(name)), "$options": "i" },
            "status": { "$ne": "deleted" }
        };
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
        let filter = doc! {
            "seller_id": seller_id.to_string(),
            "status": { "$ne": "deleted" }
        };
        let cursor = self.collection.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn insert(&self, product: Product) -> Result<()> {
        self.collection.insert_one(product, None).await?;
        Ok(())
    }

    /// Generic `$set` update; callers build the fields they touched.
    pub async fn update_fields(&self, id: Uuid, mut set: Document) -> Result<()> {
        set.insert("updated_at", mongodb::bson::DateTime::now());
        self.collection
            .update_one(doc! { "_id": id.to_string() }, doc! { "$set": set }, None)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: ProductStatus) -> Result<()> {
        let now = mongodb::bson::DateTime::now();
        let mut set = doc! {
            "status": mongodb::bson::to_bson(&status)?,
            "updated_at": now
        };
        if status == ProductStatus::Deleted {
            set.insert("deleted_at", now);
        }
        self.collection
            .update_one(doc! { "_id": id.to_string() }, doc! { "$set": set }, None)
            .await?;
        Ok(())
    }
}
