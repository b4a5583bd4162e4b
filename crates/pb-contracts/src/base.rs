//! Base contract system

use pb_core::error::ValidationErrors;

pub use pb_core::traits::UserContext;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;

    /// Check if an attribute is writable
    fn is_writable(&self, _attribute: &str) -> bool {
        true
    }
}

/// Shared presence/length checks used by several contracts
pub fn validate_title(title: &str, errors: &mut ValidationErrors) {
    if title.trim().is_empty() {
        errors.add("title", "can't be blank");
    } else if title.len() > 255 {
        errors.add("title", "is too long (maximum is 255 characters)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        let mut errors = ValidationErrors::new();
        validate_title("Quarterly revenue", &mut errors);
        assert!(errors.is_empty());

        let mut errors = ValidationErrors::new();
        validate_title("   ", &mut errors);
        assert!(errors.has_error("title"));

        let mut errors = ValidationErrors::new();
        validate_title(&"x".repeat(300), &mut errors);
        assert!(errors.has_error("title"));
    }
}
