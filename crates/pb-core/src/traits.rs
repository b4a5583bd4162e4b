//! Core traits shared across the workspace.

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Send + Sync {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}

/// User context for permission checks.
///
/// Implemented by the auth layer's `CurrentUser`; contracts and services
/// only see this trait.
pub trait UserContext: Send + Sync {
    fn user_id(&self) -> Id;
    fn is_admin(&self) -> bool;
    fn department_id(&self) -> Option<Id>;
    /// Check a named role (e.g. "secretary", "department_manager")
    fn has_role(&self, role: &str) -> bool;

    /// Managers and admins may act on a department's records
    fn can_manage_department(&self, department_id: Id) -> bool {
        self.is_admin()
            || (self.has_role("department_manager") && self.department_id() == Some(department_id))
    }

    /// Reservation approval is restricted to secretaries and admins
    fn can_approve_reservations(&self) -> bool {
        self.is_admin() || self.has_role("secretary")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestUser {
        admin: bool,
        roles: Vec<&'static str>,
        department: Option<Id>,
    }

    impl UserContext for TestUser {
        fn user_id(&self) -> Id {
            1
        }
        fn is_admin(&self) -> bool {
            self.admin
        }
        fn department_id(&self) -> Option<Id> {
            self.department
        }
        fn has_role(&self, role: &str) -> bool {
            self.roles.contains(&role)
        }
    }

    #[test]
    fn test_department_management() {
        let manager = TestUser {
            admin: false,
            roles: vec!["department_manager"],
            department: Some(5),
        };
        assert!(manager.can_manage_department(5));
        assert!(!manager.can_manage_department(6));

        let admin = TestUser {
            admin: true,
            roles: vec![],
            department: None,
        };
        assert!(admin.can_manage_department(6));
    }

    #[test]
    fn test_reservation_approval() {
        let secretary = TestUser {
            admin: false,
            roles: vec!["secretary"],
            department: None,
        };
        assert!(secretary.can_approve_reservations());

        let employee = TestUser {
            admin: false,
            roles: vec!["employee"],
            department: Some(1),
        };
        assert!(!employee.can_approve_reservations());
    }
}
