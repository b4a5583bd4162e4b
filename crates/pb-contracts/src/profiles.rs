//! Profile contracts

use once_cell::sync::Lazy;
use pb_core::error::ValidationErrors;
use pb_models::Profile;
use regex::Regex;

use crate::base::{Contract, UserContext, ValidationResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Contract for creating or updating a profile
pub struct ProfileContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> ProfileContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    fn validate_email(&self, entity: &Profile, errors: &mut ValidationErrors) {
        if entity.email.trim().is_empty() {
            errors.add("email", "can't be blank");
        } else if !EMAIL_RE.is_match(&entity.email) {
            errors.add("email", "is not a valid email address");
        }
    }

    fn validate_name(&self, entity: &Profile, errors: &mut ValidationErrors) {
        if entity.name.trim().is_empty() {
            errors.add("name", "can't be blank");
        }
    }

    fn validate_user_allowed(&self, errors: &mut ValidationErrors) {
        if !self.user.is_admin() {
            errors.add_base("Only administrators can manage profiles");
        }
    }
}

impl<'a, U: UserContext> Contract<Profile> for ProfileContract<'a, U> {
    fn validate(&self, entity: &Profile) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_user_allowed(&mut errors);
        self.validate_email(entity, &mut errors);
        self.validate_name(entity, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(attribute, "email" | "name" | "department_id" | "active")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::traits::Id;

    struct MockAdmin;

    impl UserContext for MockAdmin {
        fn user_id(&self) -> Id {
            1
        }
        fn is_admin(&self) -> bool {
            true
        }
        fn department_id(&self) -> Option<Id> {
            None
        }
        fn has_role(&self, _role: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_valid_profile() {
        let contract = ProfileContract::new(&MockAdmin);
        let profile = Profile::new("ada@example.com", "Ada Lovelace");
        assert!(contract.validate(&profile).is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let contract = ProfileContract::new(&MockAdmin);

        let profile = Profile::new("not-an-email", "Ada Lovelace");
        let errors = contract.validate(&profile).unwrap_err();
        assert!(errors.has_error("email"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let contract = ProfileContract::new(&MockAdmin);

        let profile = Profile::new("ada@example.com", "  ");
        let errors = contract.validate(&profile).unwrap_err();
        assert!(errors.has_error("name"));
    }
}
