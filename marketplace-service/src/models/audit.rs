use mongodb::bson::{Bson, DateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only audit record written by services on state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<String>,
    pub actor_id: Option<String>,
    pub actor_role: Option<String>,
    pub status: String,
    pub message: String,
    pub before_state: Option<Bson>,
    pub after_state: Option<Bson>,
    pub created_at: DateTime,
}
