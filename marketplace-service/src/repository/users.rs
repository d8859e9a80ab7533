use crate::models::User;
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{bson::doc, Collection, Database, IndexModel};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    /// Unique index on email so duplicate registration fails at the store too.
    pub async fn init_indexes(&self) -> Result<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_email_idx".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(email_index, None).await?;
        Ok(())
    }

    pub async fn insert(&self, user: User) -> Result<()> {
        self.collection.insert_one(user, None).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let filter = doc! { "_id": id.to_string(), "is_deleted": false };
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let filter = doc! { "email": email, "is_deleted": false };
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .collection
            .find(doc! { "is_deleted": false }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Profile fields only; email and password have dedicated updates.
    pub async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<()> {
        let update = doc! {
            "$set": {
                "first_name": first_name,
                "last_name": last_name,
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

    pub async fn update_email(&self, id: Uuid, email: &str) -> Result<()> {
        let update = doc! {
            "$set": { "email": email, "updated_at": mongodb::bson::DateTime::now() }
        };
        self.collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(())
    }

    pub async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let update = doc! {
            "$set": { "password_hash": password_hash, "updated_at": mongodb::bson::DateTime::now() }
        };
        self.collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(())
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let now = mongodb::bson::DateTime::now();
        let update = doc! {
            "$set": { "is_deleted": true, "deleted_at": now, "updated_at": now }
        };
        self.collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(())
    }
}
