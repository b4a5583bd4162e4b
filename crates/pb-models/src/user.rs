//! Profile and role models

use chrono::{DateTime, Utc};
use pb_core::traits::{Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

/// A user profile
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Option<Id>,
    pub email: String,
    pub name: String,
    pub department_id: Option<Id>,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            active: true,
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Identifiable for Profile {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Profile {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Roles a profile can hold. A profile may hold several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    DepartmentManager,
    Employee,
    Secretary,
    BoardMember,
    CompanyManager,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::DepartmentManager,
        Role::Employee,
        Role::Secretary,
        Role::BoardMember,
        Role::CompanyManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::DepartmentManager => "department_manager",
            Role::Employee => "employee",
            Role::Secretary => "secretary",
            Role::BoardMember => "board_member",
            Role::CompanyManager => "company_manager",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "department_manager" => Some(Role::DepartmentManager),
            "employee" => Some(Role::Employee),
            "secretary" => Some(Role::Secretary),
            "board_member" => Some(Role::BoardMember),
            "company_manager" => Some(Role::CompanyManager),
            _ => None,
        }
    }

    /// Company-wide read access (dashboards across departments)
    pub fn has_company_wide_read(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::BoardMember | Role::CompanyManager
        )
    }
}

/// A (user, role) assignment. One row per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub user_id: Id,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("intern"), None);
    }

    #[test]
    fn test_company_wide_read() {
        assert!(Role::BoardMember.has_company_wide_read());
        assert!(Role::CompanyManager.has_company_wide_read());
        assert!(!Role::Employee.has_company_wide_read());
        assert!(!Role::Secretary.has_company_wide_read());
    }

    #[test]
    fn test_new_profile_is_active() {
        let profile = Profile::new("ada@example.com", "Ada");
        assert!(profile.is_active());
        assert!(profile.is_new_record());
    }
}
