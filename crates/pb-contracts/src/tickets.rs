//! Ticket contracts

use pb_core::error::ValidationErrors;
use pb_models::Ticket;

use crate::base::{validate_title, Contract, UserContext, ValidationResult};

/// Contract for creating or updating a ticket
pub struct TicketContract<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> TicketContract<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    fn validate_departments(&self, entity: &Ticket, errors: &mut ValidationErrors) {
        if entity.source_department_id == 0 {
            errors.add("source_department", "can't be blank");
        }
        if entity.target_department_id == 0 {
            errors.add("target_department", "can't be blank");
        }
    }

    fn validate_creator(&self, entity: &Ticket, errors: &mut ValidationErrors) {
        if entity.created_by != self.user.user_id() && !self.user.is_admin() {
            errors.add("created_by", "must be the submitting user");
        }
    }
}

impl<'a, U: UserContext> Contract<Ticket> for TicketContract<'a, U> {
    fn validate(&self, entity: &Ticket) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        validate_title(&entity.title, &mut errors);
        self.validate_departments(entity, &mut errors);
        self.validate_creator(entity, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(
            attribute,
            "title" | "description" | "priority" | "status" | "target_department_id" | "assigned_to"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::traits::Id;

    struct MockUser {
        id: Id,
    }

    impl UserContext for MockUser {
        fn user_id(&self) -> Id {
            self.id
        }
        fn is_admin(&self) -> bool {
            false
        }
        fn department_id(&self) -> Option<Id> {
            Some(1)
        }
        fn has_role(&self, _role: &str) -> bool {
            false
        }
    }

    fn ticket() -> Ticket {
        Ticket {
            title: "Printer offline".into(),
            source_department_id: 1,
            target_department_id: 2,
            created_by: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_ticket() {
        let user = MockUser { id: 5 };
        let contract = TicketContract::new(&user);
        assert!(contract.validate(&ticket()).is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let user = MockUser { id: 5 };
        let contract = TicketContract::new(&user);

        let mut entity = ticket();
        entity.title = "".into();
        let errors = contract.validate(&entity).unwrap_err();
        assert!(errors.has_error("title"));
    }

    #[test]
    fn test_missing_target_department_rejected() {
        let user = MockUser { id: 5 };
        let contract = TicketContract::new(&user);

        let mut entity = ticket();
        entity.target_department_id = 0;
        let errors = contract.validate(&entity).unwrap_err();
        assert!(errors.has_error("target_department"));
    }

    #[test]
    fn test_creator_must_match() {
        let user = MockUser { id: 9 };
        let contract = TicketContract::new(&user);

        let errors = contract.validate(&ticket()).unwrap_err();
        assert!(errors.has_error("created_by"));
    }
}
