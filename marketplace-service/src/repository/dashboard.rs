//! Read-only aggregation queries backing the admin and seller dashboards.

use crate::models::{Order, Product, Role, User};
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};
use uuid::Uuid;

#[derive(Clone)]
pub struct DashboardRepository {
    orders: Collection<Order>,
    products: Collection<Product>,
    users: Collection<User>,
}

impl DashboardRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            orders: db.collection("orders"),
            products: db.collection("products"),
            users: db.collection("users"),
        }
    }

    pub async fn count_all_products(&self) -> Result<u64> {
        Ok(self.products.count_documents(doc! {}, None).await?)
    }

    pub async fn count_products_by_seller(&self, seller_id: Uuid) -> Result<u64> {
        let filter = doc! { "seller_id": seller_id.to_string() };
        Ok(self.products.count_documents(filter, None).await?)
    }

    pub async fn count_all_customers(&self) -> Result<u64> {
        let filter = doc! {
            "role": mongodb::bson::to_bson(&Role::Customer)?,
            "is_deleted": false
        };
        Ok(self.users.count_documents(filter, None).await?)
    }

    pub async fn count_all_pending_orders(&self) -> Result<u64> {
        let filter = doc! { "status": "Pending" };
        Ok(self.orders.count_documents(filter, None).await?)
    }

    pub async fn count_pending_orders_by_seller(&self, seller_id: Uuid) -> Result<u64> {
        let filter = doc! {
            "items": { "$elemMatch": {
                "seller_id": seller_id.to_string(),
                "seller_status": "Pending"
            }}
        };
        Ok(self.orders.count_documents(filter, None).await?)
    }

    /// Total revenue across paid orders.
    pub async fn total_revenue(&self) -> Result<f64> {
        let pipeline = vec![
            doc! { "$match": { "payment.status": "paid" } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$total" } } },
        ];
        let mut cursor = self.orders.aggregate(pipeline, None).await?;
        match cursor.try_next().await? {
            Some(result) => Ok(result.get_f64("total").unwrap_or(0.0)),
            None => Ok(0.0),
        }
    }

    /// Revenue from the seller's own item snapshots on orders still pending
    /// fulfillment by that seller.
    pub async fn revenue_by_seller(&self, seller_id: Uuid) -> Result<f64> {
        let pipeline = vec![
            doc! { "$unwind": "$items" },
            doc! { "$match": {
                "items.seller_id": seller_id.to_string(),
                "items.seller_status": "Pending"
            }},
            doc! { "$group": {
                "_id": null,
                "revenue": { "$sum": { "$multiply": ["$items.quantity", "$items.price"] } }
            }},
        ];
        let mut cursor = self.orders.aggregate(pipeline, None).await?;
        match cursor.try_next().await? {
            Some(result) => Ok(result.get_f64("revenue").unwrap_or(0.0)),
            None => Ok(0.0),
        }
    }

    pub async fn monthly_orders_admin(&self) -> Result<Vec<Document>> {
        let pipeline = vec![
            Self::daily_order_group(),
            Self::monthly_order_regroup(),
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let cursor = self.orders.aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn monthly_orders_by_seller(&self, seller_id: Uuid) -> Result<Vec<Document>> {
        let pipeline = vec![
            doc! { "$unwind": "$items" },
            doc! { "$match": {
                "items.seller_id": seller_id.to_string(),
                "items.seller_status": { "$in": ["Pending", "Shipped", "Delivered"] }
            }},
            Self::daily_order_group(),
            Self::monthly_order_regroup(),
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let cursor = self.orders.aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn monthly_revenue_admin(&self) -> Result<Vec<Document>> {
        let pipeline = vec![
            doc! { "$match": { "payment.status": "paid" } },
            doc! { "$group": {
                "_id": {
                    "year": { "$year": "$created_at" },
                    "month": { "$month": "$created_at" },
                    "day": { "$dayOfMonth": "$created_at" },
                },
                "daily_revenue": { "$sum": "$total" },
            }},
            Self::monthly_revenue_regroup(),
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let cursor = self.orders.aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn monthly_revenue_by_seller(&self, seller_id: Uuid) -> Result<Vec<Document>> {
        let pipeline = vec![
            doc! { "$unwind": "$items" },
            doc! { "$match": {
                "items.seller_id": seller_id.to_string(),
                "payment.status": "paid"
            }},
            doc! { "$group": {
                "_id": {
                    "year": { "$year": "$created_at" },
                    "month": { "$month": "$created_at" },
                    "day": { "$dayOfMonth": "$created_at" },
                },
                "daily_revenue": { "$sum": { "$multiply": ["$items.quantity", "$items.price"] } },
            }},
            Self::monthly_revenue_regroup(),
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        let cursor = self.orders.aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }

    fn daily_order_group() -> Document {
        doc! { "$group": {
            "_id": {
                "year": { "$year": "$created_at" },
                "month": { "$month": "$created_at" },
                "day": { "$dayOfMonth": "$created_at" },
            },
            "daily_order_count": { "$sum": 1 },
        }}
    }

    fn monthly_order_regroup() -> Document {
        doc! { "$group": {
            "_id": { "year": "$_id.year", "month": "$_id.month" },
            "days": { "$push": { "day": "$_id.day", "count": "$daily_order_count" } },
            "monthly_order_count": { "$sum": "$daily_order_count" },
        }}
    }

    fn monthly_revenue_regroup() -> Document {
        doc! { "$group": {
            "_id": { "year": "$_id.year", "month": "$_id.month" },
            "days": { "$push": { "day": "$_id.day", "revenue": "$daily_revenue" } },
            "monthly_revenue": { "$sum": "$daily_revenue" },
        }}
    }
}
