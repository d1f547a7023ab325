//! Notification sink trait (port)

use async_trait::async_trait;

use crate::domain::{NewNotification, Notification};
use crate::error::DomainError;

/// Write surface for the dispatcher. Notifications are persisted unread; no
/// de-duplication happens at this layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError>;
}
