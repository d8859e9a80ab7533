use crate::models::ShippingAddress;
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};
use uuid::Uuid;

#[derive(Clone)]
pub struct ShippingRepository {
    collection: Collection<ShippingAddress>,
}

impl ShippingRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("shipping_addresses"),
        }
    }

    pub async fn insert(&self, address: ShippingAddress) -> Result<()> {
        self.collection.insert_one(address, None).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ShippingAddress>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?)
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<ShippingAddress>> {
        let filter = doc! { "customer_id": customer_id.to_string() };
        let cursor = self.collection.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, id: Uuid, address: &ShippingAddress) -> Result<()> {
        let update = doc! {
            "$set": {
                "full_name": &address.full_name,
                "email": &address.email,
                "phone": &address.phone,
                "region": &address.region,
                "city": &address.city,
                "address": &address.address,
                "is_default": address.is_default,
                "updated_at": mongodb::bson::DateTime::now()
            }
        };
        self.collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(())
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }
}
