//! API error handling
//!
//! Provides HTTP error types with HAL+JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pb_core::error::ValidationErrors;
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound { resource: &'static str, message: String },
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound {
            resource,
            message: format!("{} with id {} not found", resource, id),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    /// Map a repository failure onto the HTTP surface
    pub fn from_repository(resource: &'static str, err: pb_db::RepositoryError) -> Self {
        match err {
            pb_db::RepositoryError::NotFound(msg) => ApiError::NotFound {
                resource,
                message: msg,
            },
            pb_db::RepositoryError::Validation(msg) => ApiError::BadRequest(msg),
            pb_db::RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            pb_db::RepositoryError::Database(e) => {
                tracing::error!(resource, error = %e, "database error");
                ApiError::Internal("Database error".to_string())
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

#[derive(Serialize)]
struct HalError {
    #[serde(rename = "_type")]
    type_name: String,
    #[serde(rename = "errorIdentifier")]
    error_identifier: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            ApiError::NotFound { message, .. } => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:NotFound".into(),
                message: message.clone(),
            },
            ApiError::Validation(errors) => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:PropertyConstraintViolation".into(),
                message: errors.full_messages().join(", "),
            },
            ApiError::Unauthorized(msg) => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:Unauthenticated".into(),
                message: msg.clone(),
            },
            ApiError::Forbidden(msg) => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:MissingPermission".into(),
                message: msg.clone(),
            },
            ApiError::BadRequest(msg) => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:InvalidRequestBody".into(),
                message: msg.clone(),
            },
            ApiError::Conflict(msg) => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:UpdateConflict".into(),
                message: msg.clone(),
            },
            ApiError::Internal(msg) => HalError {
                type_name: "Error".into(),
                error_identifier: "urn:pulseboard:api:errors:InternalError".into(),
                message: msg.clone(),
            },
        };

        (status, Json(error)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::not_found("Ticket", 1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );

        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        assert_eq!(
            ApiError::from(errors).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        let err = ApiError::from_repository(
            "Ticket",
            pb_db::RepositoryError::Conflict("duplicate".into()),
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
