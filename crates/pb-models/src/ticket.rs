//! Cross-department ticket model

use chrono::{DateTime, Utc};
use pb_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

use crate::priority::Priority;

/// Workflow state of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, TicketStatus::Open | TicketStatus::InProgress)
    }
}

/// A support/work request routed between departments
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Option<Id>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TicketStatus,
    pub source_department_id: Id,
    pub target_department_id: Id,
    pub created_by: Id,
    pub assigned_to: Option<Id>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }
}

impl Identifiable for Ticket {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Ticket {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// A comment on a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketComment {
    pub id: Option<Id>,
    pub ticket_id: Id,
    pub author_id: Id,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_open_states() {
        assert!(TicketStatus::Open.is_open());
        assert!(TicketStatus::InProgress.is_open());
        assert!(!TicketStatus::Resolved.is_open());
        assert!(!TicketStatus::Closed.is_open());
    }
}
