//! # pb-contracts
//!
//! Contract validation for Pulseboard write operations.

pub mod base;
pub mod kpis;
pub mod profiles;
pub mod reservations;
pub mod tickets;

pub use base::{Contract, ValidationResult};
