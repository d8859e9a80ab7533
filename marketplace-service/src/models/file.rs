use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for an uploaded product image; bytes live on local disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub original_name: String,
    pub url: String,
    pub size: i64,
    pub mime_type: String,
}
