//! Reservation services
//!
//! Booking goes through the reservation contract (window invariant +
//! conflict check); approval re-checks conflicts against the room's
//! already-approved bookings so two compatible pending requests cannot
//! both be approved.

use chrono::NaiveDateTime;
use pb_contracts::base::UserContext;
use pb_contracts::reservations::ReservationContract;
use pb_contracts::Contract;
use pb_core::result::ServiceResult;
use pb_core::traits::Id;
use pb_models::{conflicts_with, Reservation, ReservationStatus};

/// Parameters for booking a room
#[derive(Debug, Clone)]
pub struct ReservationParams {
    pub room_id: Id,
    pub requested_by: Id,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub notes: Option<String>,
}

/// Service for creating a reservation request
pub struct CreateReservationService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> CreateReservationService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Validate against the room's existing bookings and build a pending
    /// reservation ready to persist.
    pub fn call(&self, params: ReservationParams, existing: &[Reservation]) -> ServiceResult<Reservation> {
        let reservation = Reservation {
            id: None,
            room_id: params.room_id,
            requested_by: params.requested_by,
            approved_by: None,
            start_time: params.start_time,
            end_time: params.end_time,
            status: ReservationStatus::Pending,
            notes: params.notes,
            created_at: None,
        };

        let contract = ReservationContract::new(self.user, existing);
        if let Err(errors) = contract.validate(&reservation) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::success(reservation)
    }
}

/// Service for rescheduling an existing reservation
pub struct RescheduleReservationService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> RescheduleReservationService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    pub fn call(
        &self,
        mut reservation: Reservation,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        existing: &[Reservation],
    ) -> ServiceResult<Reservation> {
        reservation.start_time = start_time;
        reservation.end_time = end_time;
        // Rescheduling reopens the approval workflow
        reservation.status = ReservationStatus::Pending;
        reservation.approved_by = None;

        let contract = ReservationContract::new(self.user, existing);
        if let Err(errors) = contract.validate(&reservation) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::success(reservation)
    }
}

/// Service for approving or rejecting a pending reservation
pub struct ApproveReservationService<'a, U: UserContext> {
    user: &'a U,
}

impl<'a, U: UserContext> ApproveReservationService<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Approve the reservation. `approved` is the room's currently
    /// approved bookings; approval fails if one of them overlaps.
    pub fn approve(
        &self,
        mut reservation: Reservation,
        approved: &[Reservation],
    ) -> ServiceResult<Reservation> {
        if !self.user.can_approve_reservations() {
            return ServiceResult::failure_with_message(
                "Only secretaries and administrators can approve reservations",
            );
        }

        if reservation.status == ReservationStatus::Rejected {
            return ServiceResult::failure_with_message("Rejected reservations cannot be approved");
        }

        let others: Vec<Reservation> = approved
            .iter()
            .filter(|r| r.id != reservation.id)
            .cloned()
            .collect();

        if conflicts_with(&others, reservation.start_time, reservation.end_time) {
            return ServiceResult::failure_with_message(
                "An approved reservation already covers this window",
            );
        }

        reservation.status = ReservationStatus::Approved;
        reservation.approved_by = Some(self.user.user_id());
        ServiceResult::success(reservation)
    }

    pub fn reject(&self, mut reservation: Reservation) -> ServiceResult<Reservation> {
        if !self.user.can_approve_reservations() {
            return ServiceResult::failure_with_message(
                "Only secretaries and administrators can reject reservations",
            );
        }

        reservation.status = ReservationStatus::Rejected;
        reservation.approved_by = Some(self.user.user_id());
        ServiceResult::success(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct MockUser {
        id: Id,
        secretary: bool,
    }

    impl UserContext for MockUser {
        fn user_id(&self) -> Id {
            self.id
        }
        fn is_admin(&self) -> bool {
            false
        }
        fn department_id(&self) -> Option<Id> {
            None
        }
        fn has_role(&self, role: &str) -> bool {
            self.secretary && role == "secretary"
        }
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn booking(id: Id, start: NaiveDateTime, end: NaiveDateTime, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Some(id),
            room_id: 1,
            requested_by: 3,
            approved_by: None,
            start_time: start,
            end_time: end,
            status,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_create_conflicting_booking_fails() {
        let user = MockUser { id: 3, secretary: false };
        let service = CreateReservationService::new(&user);

        let existing = vec![booking(1, at(9, 0), at(10, 0), ReservationStatus::Approved)];
        let params = ReservationParams {
            room_id: 1,
            requested_by: 3,
            start_time: at(9, 30),
            end_time: at(10, 30),
            notes: None,
        };

        let result = service.call(params, &existing);
        assert!(result.is_failure());
    }

    #[test]
    fn test_create_adjacent_booking_succeeds() {
        let user = MockUser { id: 3, secretary: false };
        let service = CreateReservationService::new(&user);

        let existing = vec![booking(1, at(9, 0), at(10, 0), ReservationStatus::Approved)];
        let params = ReservationParams {
            room_id: 1,
            requested_by: 3,
            start_time: at(10, 0),
            end_time: at(11, 0),
            notes: None,
        };

        let result = service.call(params, &existing);
        assert!(result.is_success());
        let reservation = result.result.unwrap();
        assert_eq!(reservation.status, ReservationStatus::Pending);
    }

    #[test]
    fn test_approval_requires_secretary() {
        let employee = MockUser { id: 3, secretary: false };
        let service = ApproveReservationService::new(&employee);

        let pending = booking(2, at(9, 0), at(10, 0), ReservationStatus::Pending);
        assert!(service.approve(pending, &[]).is_failure());
    }

    #[test]
    fn test_approval_rechecks_conflicts() {
        let secretary = MockUser { id: 8, secretary: true };
        let service = ApproveReservationService::new(&secretary);

        let pending = booking(2, at(9, 30), at(10, 30), ReservationStatus::Pending);
        let approved = vec![booking(1, at(9, 0), at(10, 0), ReservationStatus::Approved)];

        let result = service.approve(pending, &approved);
        assert!(result.is_failure());
    }

    #[test]
    fn test_approval_stamps_approver() {
        let secretary = MockUser { id: 8, secretary: true };
        let service = ApproveReservationService::new(&secretary);

        let pending = booking(2, at(11, 0), at(12, 0), ReservationStatus::Pending);
        let result = service.approve(pending, &[]);

        assert!(result.is_success());
        let approved = result.result.unwrap();
        assert_eq!(approved.status, ReservationStatus::Approved);
        assert_eq!(approved.approved_by, Some(8));
    }

    #[test]
    fn test_reschedule_resets_approval() {
        let user = MockUser { id: 3, secretary: false };
        let service = RescheduleReservationService::new(&user);

        let approved = booking(2, at(9, 0), at(10, 0), ReservationStatus::Approved);
        let result = service.call(approved, at(13, 0), at(14, 0), &[]);

        assert!(result.is_success());
        let rescheduled = result.result.unwrap();
        assert_eq!(rescheduled.status, ReservationStatus::Pending);
        assert_eq!(rescheduled.approved_by, None);
    }
}
