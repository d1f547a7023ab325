//! PostgreSQL notification sink

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use rental_core::domain::{NewNotification, Notification};
use rental_core::error::DomainError;
use rental_core::repositories::NotificationRepository;

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError> {
        let record = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind.clone(),
            content: notification.content.clone(),
            url: notification.url.clone(),
            is_read: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, content, url, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.kind)
        .bind(&record.content)
        .bind(&record.url)
        .bind(record.is_read)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating notification for user {}: {}", record.user_id, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(record)
    }
}
