//! Validation of user-supplied identifiers (domains, emails, client ids).

mod validators;

pub use validators::{validate_client_id, validate_domain, validate_email};

/// Type alias for validation results
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A single rejected field with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}': {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error for `field`.
    pub fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field, value: value.into(), message: message.into() }
    }
}
