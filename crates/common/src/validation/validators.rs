use once_cell::sync::Lazy;
use regex::Regex;

use super::{ValidationError, ValidationResult};

/// Static domain regex pattern compiled once at first use
static DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w.-]+\.\w+$").expect("DOMAIN_REGEX pattern is valid and well-formed")
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w.-]+)@([\w.-]+\.\w+)$").expect("EMAIL_REGEX pattern is valid and well-formed")
});

static NO_WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+$").expect("NO_WHITESPACE_REGEX pattern is valid"));

/// Accepts `example.com`, `sub.example-corp.co`.
pub fn validate_domain(value: &str) -> ValidationResult<&str> {
    if DOMAIN_REGEX.is_match(value) {
        Ok(value)
    } else {
        Err(ValidationError::new("domain", value, "expected a domain such as example.com"))
    }
}

/// Accepts `user@example.com`; the domain part follows [`validate_domain`].
pub fn validate_email(value: &str) -> ValidationResult<&str> {
    if EMAIL_REGEX.is_match(value) {
        Ok(value)
    } else {
        Err(ValidationError::new("email", value, "expected an address such as user@example.com"))
    }
}

/// Client ids are opaque but never contain whitespace.
pub fn validate_client_id(value: &str) -> ValidationResult<&str> {
    if NO_WHITESPACE_REGEX.is_match(value) {
        Ok(value)
    } else {
        Err(ValidationError::new("client id", value, "must be non-empty and contain no whitespace"))
    }
}
