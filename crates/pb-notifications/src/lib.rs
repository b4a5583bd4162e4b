//! # pb-notifications
//!
//! In-app notification records and dispatch for Pulseboard.

pub mod notification;
pub mod service;

pub use notification::{Notification, NotificationCategory, NotificationSettings};
pub use service::{MemoryNotificationStore, NotificationService, NotificationStore};
