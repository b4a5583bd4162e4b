//! Result type aliases and the service result pattern.

use crate::error::{CoreError, ValidationErrors};

/// Standard Result type for Pulseboard operations
pub type PbResult<T> = Result<T, CoreError>;

/// Outcome of a service object call: a value on success, accumulated
/// validation errors on failure.
#[derive(Debug)]
pub struct ServiceResult<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// The result value (if successful)
    pub result: Option<T>,
    /// Errors (if failed)
    pub errors: ValidationErrors,
}

impl<T> ServiceResult<T> {
    /// Create a successful result
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: ValidationErrors::new(),
        }
    }

    /// Create a failed result with errors
    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            result: None,
            errors,
        }
    }

    /// Create a failed result with a single error message
    pub fn failure_with_message(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::failure(errors)
    }

    /// Check if the result is successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Check if the result is a failure
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Borrow the result value
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Borrow the errors
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Map the result value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceResult<U> {
        ServiceResult {
            success: self.success,
            result: self.result.map(f),
            errors: self.errors,
        }
    }

    /// Chain another service call
    pub fn and_then<U, F: FnOnce(T) -> ServiceResult<U>>(self, f: F) -> ServiceResult<U> {
        if self.success {
            if let Some(result) = self.result {
                return f(result);
            }
        }
        ServiceResult {
            success: false,
            result: None,
            errors: self.errors,
        }
    }

    /// Convert to standard Result
    pub fn into_result(self) -> PbResult<T> {
        if self.success {
            self.result.ok_or_else(|| {
                CoreError::Internal("ServiceResult success but no result value".into())
            })
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}

impl<T> From<PbResult<T>> for ServiceResult<T> {
    fn from(result: PbResult<T>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(CoreError::Validation(errors)) => ServiceResult::failure(errors),
            Err(e) => ServiceResult::failure_with_message(e.to_string()),
        }
    }
}

impl<T> From<ServiceResult<T>> for PbResult<T> {
    fn from(result: ServiceResult<T>) -> Self {
        result.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.result(), Some(&42));
    }

    #[test]
    fn test_failure() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "can't be blank");
        let result: ServiceResult<i32> = ServiceResult::failure(errors);

        assert!(result.is_failure());
        assert!(result.errors().has_error("name"));
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_map_and_chain() {
        let result = ServiceResult::success(2).map(|v| v * 10);
        assert_eq!(result.result, Some(20));

        let chained = result.and_then(|v| ServiceResult::success(v + 1));
        assert_eq!(chained.result, Some(21));

        let failed: ServiceResult<i32> = ServiceResult::failure_with_message("boom");
        let still_failed = failed.and_then(|v| ServiceResult::success(v + 1));
        assert!(still_failed.is_failure());
    }
}
