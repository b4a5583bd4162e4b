//! Meeting rooms and reservations
//!
//! Reservation windows are half-open `[start, end)`; two windows overlap
//! iff `s < end && e > start`, so back-to-back bookings never conflict.

use chrono::{DateTime, NaiveDateTime, Utc};
use pb_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};

/// A bookable meeting room
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRoom {
    pub id: Option<Id>,
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub responsible_id: Option<Id>,
}

impl Identifiable for MeetingRoom {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

/// Approval state of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReservationStatus::Pending),
            "approved" => Some(ReservationStatus::Approved),
            "rejected" => Some(ReservationStatus::Rejected),
            _ => None,
        }
    }
}

/// A time-boxed booking of a meeting room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Option<Id>,
    pub room_id: Id,
    pub requested_by: Id,
    pub approved_by: Option<Id>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Strict half-open interval intersection with a candidate window
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// Rejected reservations never block a room
    pub fn blocks_room(&self) -> bool {
        self.status != ReservationStatus::Rejected
    }
}

impl Identifiable for Reservation {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

/// True iff any non-rejected reservation overlaps the candidate window
pub fn conflicts_with(
    reservations: &[Reservation],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> bool {
    reservations
        .iter()
        .any(|r| r.blocks_room() && r.overlaps(start, end))
}

/// A room annotated with its availability for a queried window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    #[serde(flatten)]
    pub room: MeetingRoom,
    pub available: bool,
}

impl RoomAvailability {
    /// A room is busy for the window iff an approved reservation overlaps it
    pub fn for_window(
        room: MeetingRoom,
        reservations: &[Reservation],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        let busy = reservations
            .iter()
            .any(|r| r.status == ReservationStatus::Approved && r.overlaps(start, end));
        Self {
            room,
            available: !busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn reservation(start: NaiveDateTime, end: NaiveDateTime, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Some(1),
            room_id: 1,
            requested_by: 1,
            approved_by: None,
            start_time: start,
            end_time: end,
            status,
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_overlapping_window_conflicts() {
        // Approved 09:00-10:00; candidate 09:30-10:30
        let existing = vec![reservation(at(9, 0), at(10, 0), ReservationStatus::Approved)];
        assert!(conflicts_with(&existing, at(9, 30), at(10, 30)));
    }

    #[test]
    fn test_adjacent_window_does_not_conflict() {
        // Approved 09:00-10:00; candidate 10:00-11:00
        let existing = vec![reservation(at(9, 0), at(10, 0), ReservationStatus::Approved)];
        assert!(!conflicts_with(&existing, at(10, 0), at(11, 0)));
    }

    #[test]
    fn test_rejected_reservations_are_ignored() {
        let existing = vec![reservation(at(9, 0), at(10, 0), ReservationStatus::Rejected)];
        assert!(!conflicts_with(&existing, at(9, 30), at(10, 30)));
    }

    #[test]
    fn test_pending_reservations_still_block() {
        let existing = vec![reservation(at(9, 0), at(10, 0), ReservationStatus::Pending)];
        assert!(conflicts_with(&existing, at(9, 30), at(10, 30)));
    }

    #[test]
    fn test_contained_and_covering_windows() {
        let existing = vec![reservation(at(9, 0), at(12, 0), ReservationStatus::Approved)];
        // Candidate inside the existing window
        assert!(conflicts_with(&existing, at(10, 0), at(11, 0)));
        // Candidate covering the existing window
        assert!(conflicts_with(&existing, at(8, 0), at(13, 0)));
        // Candidate entirely before
        assert!(!conflicts_with(&existing, at(7, 0), at(9, 0)));
    }

    #[test]
    fn test_availability_counts_only_approved() {
        let room = MeetingRoom {
            id: Some(1),
            name: "Boardroom".into(),
            capacity: 12,
            location: Some("3rd floor".into()),
            responsible_id: None,
        };
        let reservations = vec![reservation(at(9, 0), at(10, 0), ReservationStatus::Pending)];

        let availability =
            RoomAvailability::for_window(room.clone(), &reservations, at(9, 30), at(10, 30));
        // Pending bookings block creation but do not mark the room busy
        assert!(availability.available);

        let approved = vec![reservation(at(9, 0), at(10, 0), ReservationStatus::Approved)];
        let availability = RoomAvailability::for_window(room, &approved, at(9, 30), at(10, 30));
        assert!(!availability.available);
    }
}
