//! # pb-services
//!
//! Business logic services for Pulseboard.
//!
//! Services validate parameters through contracts and produce domain
//! entities or decisions; persistence happens in the API layer through
//! the repositories.

pub mod kpis;
pub mod profiles;
pub mod reservations;
pub mod tickets;

pub use pb_core::result::ServiceResult;
