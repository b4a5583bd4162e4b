//! Notification service
//!
//! Orchestrates notification storage and delivery behind a store trait so
//! the API layer can back it with PostgreSQL while tests use memory.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use pb_core::traits::Id;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::notification::{Notification, NotificationSettings};

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Notification not found: {0}")]
    NotFound(Id),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Notification storage trait
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a notification, assigning its id
    async fn create(&self, notification: &mut Notification) -> ServiceResult<Id>;

    /// Get notifications for a user
    async fn get_for_user(
        &self,
        user_id: Id,
        unread_only: bool,
        limit: usize,
    ) -> ServiceResult<Vec<Notification>>;

    /// Get user's notification settings
    async fn get_settings(&self, user_id: Id) -> ServiceResult<NotificationSettings>;

    /// Mark a notification read
    async fn mark_read(&self, id: Id, user_id: Id) -> ServiceResult<()>;

    /// Mark all as read for a user; returns how many changed
    async fn mark_all_read(&self, user_id: Id) -> ServiceResult<usize>;

    /// Get unread count for a user
    async fn unread_count(&self, user_id: Id) -> ServiceResult<usize>;
}

/// In-memory notification store for development/testing
pub struct MemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
    settings: RwLock<std::collections::HashMap<Id, NotificationSettings>>,
    next_id: AtomicI64,
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            notifications: RwLock::new(Vec::new()),
            settings: RwLock::new(std::collections::HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub async fn set_settings(&self, settings: NotificationSettings) {
        let mut map = self.settings.write().await;
        map.insert(settings.user_id, settings);
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, notification: &mut Notification) -> ServiceResult<Id> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        notification.id = Some(id);

        let mut notifications = self.notifications.write().await;
        notifications.push(notification.clone());

        Ok(id)
    }

    async fn get_for_user(
        &self,
        user_id: Id,
        unread_only: bool,
        limit: usize,
    ) -> ServiceResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || n.is_unread()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_settings(&self, user_id: Id) -> ServiceResult<NotificationSettings> {
        let settings = self.settings.read().await;
        Ok(settings
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| NotificationSettings::for_user(user_id)))
    }

    async fn mark_read(&self, id: Id, user_id: Id) -> ServiceResult<()> {
        let mut notifications = self.notifications.write().await;
        let found = notifications
            .iter_mut()
            .find(|n| n.id == Some(id) && n.user_id == user_id);

        match found {
            Some(notification) => {
                notification.mark_read();
                Ok(())
            }
            None => Err(ServiceError::NotFound(id)),
        }
    }

    async fn mark_all_read(&self, user_id: Id) -> ServiceResult<usize> {
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for notification in notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.is_unread())
        {
            notification.mark_read();
            changed += 1;
        }
        Ok(changed)
    }

    async fn unread_count(&self, user_id: Id) -> ServiceResult<usize> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .count())
    }
}

/// Notification service over a store
pub struct NotificationService<S: NotificationStore> {
    store: S,
}

impl<S: NotificationStore> NotificationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Deliver a notification unless the recipient has opted out of its
    /// category. Returns the stored id, or None when filtered.
    pub async fn notify(&self, mut notification: Notification) -> ServiceResult<Option<Id>> {
        let settings = self.store.get_settings(notification.user_id).await?;
        if !settings.should_notify(notification.category) {
            tracing::debug!(
                user_id = notification.user_id,
                category = notification.category.as_str(),
                "notification filtered by user settings"
            );
            return Ok(None);
        }

        let id = self.store.create(&mut notification).await?;
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationCategory;

    #[tokio::test]
    async fn test_notify_and_read_flow() {
        let service = NotificationService::new(MemoryNotificationStore::new());

        let id = service
            .notify(Notification::ticket_assigned(7, 1, "Broken build"))
            .await
            .unwrap()
            .expect("should deliver");

        assert_eq!(service.store().unread_count(7).await.unwrap(), 1);

        service.store().mark_read(id, 7).await.unwrap();
        assert_eq!(service.store().unread_count(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_opt_out_filters_delivery() {
        let store = MemoryNotificationStore::new();
        let mut settings = NotificationSettings::for_user(7);
        settings.enabled_categories = vec![NotificationCategory::Kpi];
        store.set_settings(settings).await;

        let service = NotificationService::new(store);
        let delivered = service
            .notify(Notification::ticket_assigned(7, 1, "Broken build"))
            .await
            .unwrap();

        assert!(delivered.is_none());
        assert_eq!(service.store().unread_count(7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let service = NotificationService::new(MemoryNotificationStore::new());

        for i in 0..3 {
            service
                .notify(Notification::kpi_commented(7, i, "Quarterly revenue"))
                .await
                .unwrap();
        }
        service
            .notify(Notification::kpi_commented(8, 1, "Quarterly revenue"))
            .await
            .unwrap();

        assert_eq!(service.store().mark_all_read(7).await.unwrap(), 3);
        assert_eq!(service.store().unread_count(7).await.unwrap(), 0);
        assert_eq!(service.store().unread_count(8).await.unwrap(), 1);
    }
}
