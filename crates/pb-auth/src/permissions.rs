//! Role-based permission context
//!
//! The `CurrentUser` carries the roles resolved at authentication time;
//! contracts and services see it only through `pb_core::traits::UserContext`.

use pb_core::traits::{Id, UserContext};
use pb_models::Role;
use std::collections::HashSet;

/// Current user with resolved roles
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Id,
    pub email: String,
    pub name: String,
    pub department_id: Option<Id>,
    roles: HashSet<Role>,
}

impl CurrentUser {
    /// Create a new current user
    pub fn new(id: Id, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            department_id: None,
            roles: HashSet::new(),
        }
    }

    /// Create an admin user
    pub fn admin(id: Id, email: impl Into<String>, name: impl Into<String>) -> Self {
        let mut user = Self::new(id, email, name);
        user.roles.insert(Role::Admin);
        user
    }

    pub fn with_department(mut self, department_id: Id) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Build roles from their string names, ignoring unknown entries
    pub fn with_role_names<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            if let Some(role) = Role::parse(name) {
                self.roles.insert(role);
            }
        }
        self
    }

    pub fn roles(&self) -> &HashSet<Role> {
        &self.roles
    }

    pub fn role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.roles.iter().map(|r| r.as_str().to_string()).collect();
        names.sort();
        names
    }

    /// Company-wide dashboards are visible to admins, board members, and
    /// company managers
    pub fn can_view_company_dashboards(&self) -> bool {
        self.is_admin() || self.roles.iter().any(|r| r.has_company_wide_read())
    }
}

impl UserContext for CurrentUser {
    fn user_id(&self) -> Id {
        self.id
    }

    fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    fn department_id(&self) -> Option<Id> {
        self.department_id
    }

    fn has_role(&self, role: &str) -> bool {
        Role::parse(role).is_some_and(|r| self.roles.contains(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_user() {
        let user = CurrentUser::admin(1, "admin@example.com", "Admin");
        assert!(user.is_admin());
        assert!(user.can_manage_department(99));
        assert!(user.can_approve_reservations());
        assert!(user.can_view_company_dashboards());
    }

    #[test]
    fn test_department_manager() {
        let user = CurrentUser::new(2, "mgr@example.com", "Manager")
            .with_department(5)
            .with_role(Role::DepartmentManager);

        assert!(!user.is_admin());
        assert!(user.can_manage_department(5));
        assert!(!user.can_manage_department(6));
        assert!(!user.can_view_company_dashboards());
    }

    #[test]
    fn test_board_member_reads_company_wide() {
        let user = CurrentUser::new(3, "board@example.com", "Board").with_role(Role::BoardMember);
        assert!(user.can_view_company_dashboards());
        assert!(!user.can_approve_reservations());
    }

    #[test]
    fn test_role_names_round_trip() {
        let user = CurrentUser::new(4, "x@example.com", "X")
            .with_role_names(["secretary", "employee", "bogus"]);

        assert!(user.has_role("secretary"));
        assert!(user.has_role("employee"));
        assert!(!user.has_role("bogus"));
        assert_eq!(user.role_names(), vec!["employee", "secretary"]);
    }
}
