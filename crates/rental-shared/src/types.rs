//! Common types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EntityId = Uuid;

/// Audit columns shared by every soft-deletable entity. A row is considered
/// deleted when `removed_at` is set; queries must filter on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<EntityId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<EntityId>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<EntityId>,
}

impl Default for AuditFields {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            created_by: None,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        }
    }
}

impl AuditFields {
    pub fn touch(&mut self, by: Option<EntityId>) {
        self.modified_at = Some(Utc::now());
        self.modified_by = by;
    }

    pub fn tombstone(&mut self, by: Option<EntityId>) {
        self.removed_at = Some(Utc::now());
        self.removed_by = by;
    }

    pub fn is_removed(&self) -> bool {
        self.removed_at.is_some()
    }
}
