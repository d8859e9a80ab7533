use crate::models::Seller;
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use uuid::Uuid;

#[derive(Clone)]
pub struct SellerRepository {
    collection: Collection<Seller>,
}

impl SellerRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("sellers"),
        }
    }

    pub async fn init_indexes(&self) -> Result<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("seller_email_idx".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(email_index, None).await?;
        Ok(())
    }

    pub async fn insert(&self, seller: Seller) -> Result<()> {
        self.collection.insert_one(seller, None).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Seller>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Seller>> {
        Ok(self.collection.find_one(doc! { "email": email }, None).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Seller>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.collection.find(doc! {}, options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        store_name: &str,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<()> {
        let update = doc! {
            "$set": {
                "store_name": store_name,
                "phone": phone,
                "address": address,
                "updated_at": mongodb::bson::DateTime::now()
            }
        };
        self.collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(())
    }
}
