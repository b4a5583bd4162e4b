//! Reservation contracts
//!
//! Enforces the window invariant (`start < end`) and rejects candidates
//! that overlap an existing non-rejected reservation for the room.

use pb_core::error::ValidationErrors;
use pb_models::{conflicts_with, Reservation};

use crate::base::{Contract, UserContext, ValidationResult};

/// Contract for creating or rescheduling a reservation
pub struct ReservationContract<'a, U: UserContext> {
    user: &'a U,
    /// Non-rejected reservations already booked for the room, minus the
    /// reservation being edited (when rescheduling)
    existing: &'a [Reservation],
}

impl<'a, U: UserContext> ReservationContract<'a, U> {
    pub fn new(user: &'a U, existing: &'a [Reservation]) -> Self {
        Self { user, existing }
    }

    fn validate_window(&self, entity: &Reservation, errors: &mut ValidationErrors) {
        if entity.start_time >= entity.end_time {
            errors.add("end_time", "must be after start time");
        }
    }

    fn validate_no_conflict(&self, entity: &Reservation, errors: &mut ValidationErrors) {
        let others: Vec<Reservation> = self
            .existing
            .iter()
            .filter(|r| r.id.is_none() || r.id != entity.id)
            .cloned()
            .collect();

        if conflicts_with(&others, entity.start_time, entity.end_time) {
            errors.add_base("Room is already booked for this window");
        }
    }

    fn validate_requester(&self, entity: &Reservation, errors: &mut ValidationErrors) {
        if entity.requested_by != self.user.user_id() && !self.user.is_admin() {
            errors.add("requested_by", "must be the requesting user");
        }
    }
}

impl<'a, U: UserContext> Contract<Reservation> for ReservationContract<'a, U> {
    fn validate(&self, entity: &Reservation) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_window(entity, &mut errors);
        // A malformed window can't meaningfully be conflict-checked
        if !errors.has_error("end_time") {
            self.validate_no_conflict(entity, &mut errors);
        }
        self.validate_requester(entity, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(attribute, "start_time" | "end_time" | "notes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pb_core::traits::Id;
    use pb_models::ReservationStatus;

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
            None
        }
        fn has_role(&self, _role: &str) -> bool {
            false
        }
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn booking(id: Option<Id>, start: NaiveDateTime, end: NaiveDateTime) -> Reservation {
        Reservation {
            id,
            room_id: 1,
            requested_by: 7,
            approved_by: None,
            start_time: start,
            end_time: end,
            status: ReservationStatus::Approved,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_valid_reservation() {
        let user = MockUser { id: 7, admin: false };
        let existing = vec![booking(Some(1), at(9), at(10))];
        let contract = ReservationContract::new(&user, &existing);

        let candidate = booking(None, at(10), at(11));
        assert!(contract.validate(&candidate).is_ok());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let user = MockUser { id: 7, admin: false };
        let existing = vec![];
        let contract = ReservationContract::new(&user, &existing);

        let candidate = booking(None, at(11), at(10));
        let errors = contract.validate(&candidate).unwrap_err();
        assert!(errors.has_error("end_time"));
    }

    #[test]
    fn test_conflicting_window_rejected() {
        let user = MockUser { id: 7, admin: false };
        let existing = vec![booking(Some(1), at(9), at(10))];
        let contract = ReservationContract::new(&user, &existing);

        let candidate = booking(None, at(9), at(11));
        let errors = contract.validate(&candidate).unwrap_err();
        assert!(!errors.base_errors.is_empty());
    }

    #[test]
    fn test_reschedule_ignores_own_row() {
        let user = MockUser { id: 7, admin: false };
        let existing = vec![booking(Some(1), at(9), at(10))];
        let contract = ReservationContract::new(&user, &existing);

        // Extending reservation 1 within its own slot does not self-conflict
        let mut candidate = booking(Some(1), at(9), at(11));
        candidate.status = ReservationStatus::Pending;
        assert!(contract.validate(&candidate).is_ok());
    }

    #[test]
    fn test_booking_for_someone_else_requires_admin() {
        let user = MockUser { id: 2, admin: false };
        let existing = vec![];
        let contract = ReservationContract::new(&user, &existing);

        let candidate = booking(None, at(9), at(10));
        let errors = contract.validate(&candidate).unwrap_err();
        assert!(errors.has_error("requested_by"));

        let admin = MockUser { id: 2, admin: true };
        let contract = ReservationContract::new(&admin, &existing);
        assert!(contract.validate(&candidate).is_ok());
    }
}
