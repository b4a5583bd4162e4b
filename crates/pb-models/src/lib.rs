//! # pb-models
//!
//! Domain models for Pulseboard: profiles, departments, KPI targets and
//! their derived health, tickets, activities, and meeting-room reservations.

pub mod activity;
pub mod department;
pub mod kpi;
pub mod meeting;
pub mod priority;
pub mod ticket;
pub mod user;

pub use activity::{Activity, ActivityCategory};
pub use department::Department;
pub use kpi::{KpiComment, KpiHealth, KpiPeriod, KpiProgress, KpiSnapshot, KpiStatus, KpiTarget};
pub use meeting::{conflicts_with, MeetingRoom, Reservation, ReservationStatus, RoomAvailability};
pub use priority::Priority;
pub use ticket::{Ticket, TicketComment, TicketStatus};
pub use user::{Profile, Role, UserRole};
