//! # pb-api
//!
//! REST API layer for Pulseboard: axum handlers, routes, extractors, and
//! HAL-flavoured error responses.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{ApiConfig, AppState};
pub use routes::router;
