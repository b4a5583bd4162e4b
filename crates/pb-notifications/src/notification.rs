//! Notification model

use chrono::{DateTime, Utc};
use pb_core::traits::Id;
use pb_models::Priority;
use serde::{Deserialize, Serialize};

/// What part of the system a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Kpi,
    Ticket,
    Reservation,
    System,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Kpi => "kpi",
            NotificationCategory::Ticket => "ticket",
            NotificationCategory::Reservation => "reservation",
            NotificationCategory::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kpi" => Some(NotificationCategory::Kpi),
            "ticket" => Some(NotificationCategory::Ticket),
            "reservation" => Some(NotificationCategory::Reservation),
            "system" => Some(NotificationCategory::System),
            _ => None,
        }
    }
}

/// An in-app notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Option<Id>,
    pub user_id: Id,
    pub category: NotificationCategory,
    pub priority: Priority,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Id,
        category: NotificationCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            category,
            priority: Priority::Medium,
            title: title.into(),
            message: message.into(),
            is_read: false,
            link: None,
            created_at: Utc::now(),
        }
    }

    /// Notify the assignee of a ticket
    pub fn ticket_assigned(user_id: Id, ticket_id: Id, ticket_title: &str) -> Self {
        Self::new(
            user_id,
            NotificationCategory::Ticket,
            "Ticket assigned to you",
            format!("You were assigned \"{}\"", ticket_title),
        )
        .with_link(format!("/tickets/{}", ticket_id))
    }

    /// Notify the requester of a reservation decision
    pub fn reservation_decided(user_id: Id, reservation_id: Id, approved: bool) -> Self {
        let verdict = if approved { "approved" } else { "rejected" };
        Self::new(
            user_id,
            NotificationCategory::Reservation,
            format!("Reservation {}", verdict),
            format!("Your meeting room reservation was {}", verdict),
        )
        .with_link(format!("/reservations/{}", reservation_id))
    }

    /// Notify KPI assignees of a new comment
    pub fn kpi_commented(user_id: Id, kpi_id: Id, kpi_title: &str) -> Self {
        Self::new(
            user_id,
            NotificationCategory::Kpi,
            "New comment on KPI",
            format!("A comment was added to \"{}\"", kpi_title),
        )
        .with_link(format!("/kpis/{}", kpi_id))
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

/// Per-user notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub user_id: Id,
    /// Receive in-app notifications at all
    pub enabled: bool,
    /// Categories the user wants to hear about
    pub enabled_categories: Vec<NotificationCategory>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            user_id: 0,
            enabled: true,
            enabled_categories: vec![
                NotificationCategory::Kpi,
                NotificationCategory::Ticket,
                NotificationCategory::Reservation,
                NotificationCategory::System,
            ],
        }
    }
}

impl NotificationSettings {
    pub fn for_user(user_id: Id) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// Check if a notification should be delivered
    pub fn should_notify(&self, category: NotificationCategory) -> bool {
        self.enabled && self.enabled_categories.contains(&category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_builders() {
        let notification = Notification::ticket_assigned(7, 42, "Printer offline");
        assert_eq!(notification.user_id, 7);
        assert_eq!(notification.category, NotificationCategory::Ticket);
        assert_eq!(notification.link.as_deref(), Some("/tickets/42"));
        assert!(notification.is_unread());
    }

    #[test]
    fn test_mark_read() {
        let mut notification = Notification::reservation_decided(3, 9, true);
        assert!(notification.is_unread());
        notification.mark_read();
        assert!(!notification.is_unread());
    }

    #[test]
    fn test_settings_filter_categories() {
        let mut settings = NotificationSettings::for_user(1);
        settings.enabled_categories = vec![NotificationCategory::Ticket];

        assert!(settings.should_notify(NotificationCategory::Ticket));
        assert!(!settings.should_notify(NotificationCategory::Kpi));

        settings.enabled = false;
        assert!(!settings.should_notify(NotificationCategory::Ticket));
    }
}
