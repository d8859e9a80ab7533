//! Append-only audit trail.
//!
//! Audit writes are secondary to the operation being recorded: a failure is
//! logged and swallowed, never propagated to the caller.

use crate::models::AuditLog;
use mongodb::bson::{Bson, DateTime};
use mongodb::{Collection, Database};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct AuditEntry {
    pub action: &'static str,
    pub entity: &'static str,
    pub entity_id: Option<String>,
    pub actor_id: Option<Uuid>,
    pub actor_role: Option<&'static str>,
    pub message: String,
    pub before_state: Option<Bson>,
    pub after_state: Option<Bson>,
}

#[derive(Clone)]
pub struct AuditService {
    collection: Collection<AuditLog>,
}

impl AuditService {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("audit_logs"),
        }
    }

    pub async fn record(&self, entry: AuditEntry) {
        let log = AuditLog {
            id: Uuid::new_v4(),
            action: entry.action.to_string(),
            entity: entry.entity.to_string(),
            entity_id: entry.entity_id,
            actor_id: entry.actor_id.map(|id| id.to_string()),
            actor_role: entry.actor_role.map(|r| r.to_string()),
            status: "success".to_string(),
            message: entry.message,
            before_state: entry.before_state,
            after_state: entry.after_state,
            created_at: DateTime::now(),
        };

        if let Err(e) = self.collection.insert_one(log, None).await {
            tracing::warn!(error = %e, action = entry.action, "Failed to write audit log");
        }
    }
}
