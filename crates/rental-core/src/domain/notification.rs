//! Notification domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted in-app notification. Addressed to exactly one user; the only
/// field that ever mutates after creation is `is_read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub content: String,
    pub url: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

/// Payload accepted by the notification sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub content: String,
    pub url: String,
}

impl NewNotification {
    pub fn new(user_id: Uuid, kind: &str, content: String, url: String) -> Self {
        Self {
            user_id,
            kind: kind.to_string(),
            content,
            url,
        }
    }
}
