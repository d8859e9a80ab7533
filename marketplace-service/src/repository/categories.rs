use crate::models::Category;
use anyhow::Result;
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection, Database};
use uuid::Uuid;

#[derive(Clone)]
pub struct CategoryRepository {
    collection: Collection<Category>,
}

impl CategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("categories"),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Category>> {
        let cursor = self.collection.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?)
    }

    /// Case-insensitive exact name match, for duplicate checks.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let filter = doc! {
            "name": { "$regex": format!("^{}$", regex_escape(name)), "$options": "i" }
        };
        Ok(self.collection.find_one(filter, None).await?)
    }

    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Category>> {
        let filter = doc! {
            "name": { "$regex": regex_escape(query), "$options": "i" }
        };
        let cursor = self.collection.find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn insert(&self, category: Category) -> Result<()> {
        self.collection.insert_one(category, None).await?;
        Ok(())
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<()> {
        let update = doc! {
            "$set": {
                "name": name,
                "description": description,
                "updated_at": mongodb::bson::DateTime::now()
            }
        };
        self.collection
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(())
    }

    /// Hard delete. Products referencing the category keep their dangling id.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }
}

/// Escape regex metacharacters in user-supplied search input.
pub(crate) fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if ".^$*+?()[]{}|\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
