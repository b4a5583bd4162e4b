//! Core error types for Pulseboard.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all Pulseboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict: {message}")]
    Conflict { message: String },
}

/// Validation errors collection, accumulated per field
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// Return Ok(()) when empty, otherwise Err(self)
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// HTTP status code mapping for errors
impl CoreError {
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::NotFound { .. } => 404,
            CoreError::Unauthorized { .. } => 401,
            CoreError::Forbidden { .. } => 403,
            CoreError::Validation(_) => 422,
            CoreError::Conflict { .. } => 409,
            CoreError::Database(_) | CoreError::Internal(_) | CoreError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "not_found",
            CoreError::Unauthorized { .. } => "unauthorized",
            CoreError::Forbidden { .. } => "forbidden",
            CoreError::Validation(_) => "validation_failed",
            CoreError::Database(_) => "database_error",
            CoreError::Internal(_) => "internal_error",
            CoreError::Config(_) => "configuration_error",
            CoreError::Conflict { .. } => "conflict",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_accumulate() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("title", "can't be blank");
        errors.add("title", "is too short");
        errors.add_base("window is already booked");

        assert!(errors.has_error("title"));
        assert_eq!(errors.get("title").map(Vec::len), Some(2));
        assert_eq!(errors.full_messages().len(), 3);
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add("email", "is invalid");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_status_codes() {
        let err = CoreError::NotFound {
            entity: "Ticket",
            field: "id",
            value: "42".into(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "not_found");
    }
}
