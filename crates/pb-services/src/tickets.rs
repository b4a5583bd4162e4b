//! Ticket services

use pb_contracts::base::UserContext;
use pb_contracts::tickets::TicketContract;
use pb_contracts::Contract;
use pb_core::result::ServiceResult;
use pb_core::traits::Id;
use pb_models::{Priority, Ticket, TicketStatus};

/// Parameters for submitting a ticket
#[derive(Debug, Clone)]
pub struct TicketParams {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub source_department_id: Id,
    pub target_department_id: Id,
    pub assigned_to: Option<Id>,
}

/// Service for submitting a ticket
pub struct CreateTicketService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateTicketService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub fn call(&self, params: TicketParams) -> ServiceResult<Ticket> {
        let ticket = Ticket {
            id: None,
            title: params.title,
            description: params.description,
            priority: params.priority,
            status: TicketStatus::Open,
            source_department_id: params.source_department_id,
            target_department_id: params.target_department_id,
            created_by: self.user.user_id(),
            assigned_to: params.assigned_to,
            created_at: None,
            updated_at: None,
        };

        let contract = TicketContract::new(self.user);
        if let Err(errors) = contract.validate(&ticket) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::success(ticket)
    }
}

/// Service for moving a ticket through its workflow
pub struct TransitionTicketService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> TransitionTicketService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Change ticket status. The assignee, the target department's
    /// manager, and admins may transition a ticket; closed tickets stay
    /// closed.
    pub fn call(&self, mut ticket: Ticket, status: TicketStatus) -> ServiceResult<Ticket> {
        let allowed = self.user.is_admin()
            || ticket.assigned_to == Some(self.user.user_id())
            || self.user.can_manage_department(ticket.target_department_id);
        if !allowed {
            return ServiceResult::failure_with_message(
                "Only the assignee or the target department's manager can update this ticket",
            );
        }

        if ticket.status == TicketStatus::Closed {
            return ServiceResult::failure_with_message("Closed tickets cannot be reopened");
        }

        ticket.status = status;
        ServiceResult::success(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockUser {
        id: Id,
        admin: bool,
    }

    impl UserContext for MockUser {
        fn user_id(&self) -> Id {
            self.id
        }
        fn is_admin(&self) -> bool {
            self.admin
        }
        fn department_id(&self) -> Option<Id> {
            Some(1)
        }
        fn has_role(&self, _role: &str) -> bool {
            false
        }
    }

    fn params() -> TicketParams {
        TicketParams {
            title: "VPN access for contractor".into(),
            description: Some("Needs access until end of quarter".into()),
            priority: Priority::Medium,
            source_department_id: 1,
            target_department_id: 2,
            assigned_to: None,
        }
    }

    #[test]
    fn test_submit_ticket() {
        let user = MockUser { id: 5, admin: false };
        let service = CreateTicketService::new(&user);

        let result = service.call(params());
        assert!(result.is_success());
        let ticket = result.result.unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.created_by, 5);
    }

    #[test]
    fn test_assignee_can_transition() {
        let user = MockUser { id: 5, admin: false };
        let mut ticket = CreateTicketService::new(&user).call(params()).result.unwrap();
        ticket.assigned_to = Some(7);

        let assignee = MockUser { id: 7, admin: false };
        let service = TransitionTicketService::new(&assignee);

        let result = service.call(ticket, TicketStatus::InProgress);
        assert!(result.is_success());
        assert_eq!(result.result.unwrap().status, TicketStatus::InProgress);
    }

    #[test]
    fn test_bystander_cannot_transition() {
        let user = MockUser { id: 5, admin: false };
        let ticket = CreateTicketService::new(&user).call(params()).result.unwrap();

        let bystander = MockUser { id: 42, admin: false };
        let service = TransitionTicketService::new(&bystander);

        assert!(service.call(ticket, TicketStatus::Resolved).is_failure());
    }

    #[test]
    fn test_closed_tickets_stay_closed() {
        let user = MockUser { id: 5, admin: false };
        let mut ticket = CreateTicketService::new(&user).call(params()).result.unwrap();
        ticket.status = TicketStatus::Closed;

        let admin = MockUser { id: 1, admin: true };
        let service = TransitionTicketService::new(&admin);

        assert!(service.call(ticket, TicketStatus::Open).is_failure());
    }
}
