//! API handlers

pub mod activities;
pub mod auth;
pub mod categories;
pub mod departments;
pub mod kpis;
pub mod meeting_rooms;
pub mod notifications;
pub mod profiles;
pub mod reports;
pub mod reservations;
pub mod tickets;
