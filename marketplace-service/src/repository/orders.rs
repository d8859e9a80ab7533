use crate::models::{Order, OrderItemStatus, OrderStatus, SellerOrder};
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderRepository {
    collection: Collection<Order>,
}

impl OrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("orders"),
        }
    }

    pub async fn insert(&self, order: Order) -> Result<()> {
        self.collection.insert_one(order, None).await?;
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .collection
            .find(doc! { "is_deleted": false }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Standard read: the soft-delete flag is part of the filter, so deleted
    /// orders 404 even on direct id lookup.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let filter = doc! { "_id": id.to_string(), "is_deleted": false };
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let filter = doc! { "user_id": user_id.to_string(), "is_deleted": false };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Unwind the items down to the caller's, regroup per order, and recompute
    /// the total from that seller's price/quantity snapshots.
    pub async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<SellerOrder>> {
        let seller_id = seller_id.to_string();
        let pipeline = vec![
            doc! { "$match": {
                "items.seller_id": &seller_id,
                "is_deleted": false
            }},
            doc! { "$unwind": "$items" },
            doc! { "$match": { "items.seller_id": &seller_id } },
            doc! { "$group": {
                "_id": "$_id",
                "user_id": { "$first": "$user_id" },
                "shipping_id": { "$first": "$shipping_id" },
                "total": { "$sum": { "$multiply": ["$items.price", "$items.quantity"] } },
                "status": { "$first": "$status" },
                "payment": { "$first": "$payment" },
                "items": { "$push": "$items" },
                "created_at": { "$first": "$created_at" },
                "updated_at": { "$first": "$updated_at" }
            }},
            doc! { "$sort": { "created_at": -1 } },
        ];

        let mut cursor = self.collection.aggregate(pipeline, None).await?;
        let mut orders = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            orders.push(bson::from_document::<SellerOrder>(document)?);
        }
        Ok(orders)
    }

    /// Positional update of a single embedded item's seller_status. The
    /// filter scopes by seller so one seller cannot touch another's item.
    /// No transition legality check: any state may follow any other.
    pub async fn update_item_status(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        seller_id: Uuid,
        new_status: OrderItemStatus,
    ) -> Result<bool> {
        // $elemMatch keeps both conditions on the same array element; split
        // dot-notation filters could match across two different items.
        let filter = doc! {
            "_id": order_id.to_string(),
            "items": { "$elemMatch": {
                "_id": item_id.to_string(),
                "seller_id": seller_id.to_string()
            }}
        };
        let update = doc! {
            "$set": {
                "items.$.seller_status": bson::to_bson(&new_status)?,
                "updated_at": bson::DateTime::now()
            }
        };
        let result = self.collection.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<bool> {
        let now = bson::DateTime::now();
        let update = doc! {
            "$set": {
                "status": bson::to_bson(&OrderStatus::Cancelled)?,
                "cancelled_at": now,
                "updated_at": now
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let now = bson::DateTime::now();
        let update = doc! {
            "$set": { "is_deleted": true, "deleted_at": now, "updated_at": now }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    pub async fn soft_delete_by_user(&self, user_id: Uuid) -> Result<()> {
        let now = bson::DateTime::now();
        let update = doc! {
            "$set": { "is_deleted": true, "deleted_at": now, "updated_at": now }
        };
        self.collection
            .update_many(doc! { "user_id": user_id.to_string() }, update, None)
            .await?;
        Ok(())
    }

    /// Webhook path: flip the embedded payment sub-document to paid. Running
    /// this twice writes the same values, which is what makes provider
    /// redeliveries harmless.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        amount_paid: f64,
        payment_id: &str,
        receipt_url: Option<&str>,
    ) -> Result<bool> {
        let now = bson::DateTime::now();
        let update = doc! {
            "$set": {
                "payment.status": "paid",
                "payment.method": "stripe",
                "payment.amount_paid": amount_paid,
                "payment.payment_id": payment_id,
                "payment.payment_date": now,
                "payment.receipt_url": receipt_url,
                "updated_at": now
            }
        };
        let result = self
            .collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(result.matched_count == 1)
    }
}
