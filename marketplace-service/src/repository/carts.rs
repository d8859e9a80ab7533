use crate::models::{Cart, CartItem};
use anyhow::Result;
use mongodb::options::UpdateOptions;
use mongodb::{bson::doc, Collection, Database};
use uuid::Uuid;

#[derive(Clone)]
pub struct CartRepository {
    collection: Collection<Cart>,
}

impl CartRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("carts"),
        }
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>> {
        let filter = doc! { "user_id": user_id.to_string() };
        Ok(self.collection.find_one(filter, None).await?)
    }

    /// Replace the items array, creating the cart on first write.
    pub async fn upsert_items(&self, user_id: Uuid, items: &[CartItem]) -> Result<()> {
        let now = mongodb::bson::DateTime::now();
        let filter = doc! { "user_id": user_id.to_string() };
        let update = doc! {
            "$set": {
                "items": mongodb::bson::to_bson(items)?,
                "updated_at": now
            },
            "$setOnInsert": {
                "_id": Uuid::new_v4().to_string(),
                "user_id": user_id.to_string(),
                "created_at": now
            }
        };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection.update_one(filter, update, options).await?;
        Ok(())
    }

    /// Empty the items array; the cart document itself stays.
    pub async fn clear(&self, user_id: Uuid) -> Result<()> {
        let filter = doc! { "user_id": user_id.to_string() };
        let update = doc! {
            "$set": {
                "items": [],
                "updated_at": mongodb::bson::DateTime::now()
            }
        };
        self.collection.update_one(filter, update, None).await?;
        Ok(())
    }

    pub async fn remove_by_user(&self, user_id: Uuid) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "user_id": user_id.to_string() }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }
}
