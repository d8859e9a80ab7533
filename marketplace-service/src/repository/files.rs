use crate::models::StoredFile;
use anyhow::Result;
use mongodb::{bson::doc, Collection, Database};
use uuid::Uuid;

#[derive(Clone)]
pub struct FileRepository {
    collection: Collection<StoredFile>,
}

impl FileRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("files"),
        }
    }

    pub async fn insert(&self, file: StoredFile) -> Result<()> {
        self.collection.insert_one(file, None).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StoredFile>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }
}
