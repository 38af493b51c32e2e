//! API-specific error types
//!
//! Provides error classification for directory API operations with retry
//! metadata.

use std::time::Duration;

use diradmin_domain::{DirAdminError, ErrorClass};
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403, failed credential refresh)
    Authentication,
    /// Throttling (429, 402 quota, 408) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors and timeouts - retryable
    Network,
    /// Undecodable response body - non-retryable
    Decode,
    /// Configuration errors - non-retryable
    Config,
    /// Retries ran out on a transient error
    Exhausted,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String, retry_after: Option<Duration> },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String, retry_after: Option<Duration> },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<ApiError> },
}

impl ApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, message: String, retry_after: Option<Duration>) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth(message),
            402 | 408 | 429 => Self::RateLimit { message, retry_after },
            404 => Self::NotFound(message),
            code @ 500..=599 => Self::Server { status: code, message, retry_after },
            code => Self::Client { status: code, message },
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit { .. } => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } | Self::NotFound(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Config(_) => ApiErrorCategory::Config,
            Self::RetriesExhausted { .. } => ApiErrorCategory::Exhausted,
        }
    }

    /// How the failure affects a batch run
    pub fn class(&self) -> ErrorClass {
        match self.category() {
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network => {
                ErrorClass::Transient
            }
            ApiErrorCategory::Authentication | ApiErrorCategory::Config => ErrorClass::ScanFatal,
            ApiErrorCategory::Client | ApiErrorCategory::Decode | ApiErrorCategory::Exhausted => {
                ErrorClass::EntityFatal
            }
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Server-requested delay from a `Retry-After` header
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } | Self::Server { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status behind the error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        if err.is_connect() || err.is_request() {
            return Self::Network(format!("HTTP connection failure: {err}"));
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if err.is_builder() {
            return Self::Config(format!("invalid request: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::from_status(status, err.to_string(), None);
        }
        Self::Network(err.to_string())
    }
}

impl From<ApiError> for DirAdminError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Auth(_) => Self::Auth(message),
            ApiError::Config(_) => Self::Config(message),
            ApiError::RateLimit { .. }
            | ApiError::Server { .. }
            | ApiError::Network(_)
            | ApiError::Timeout(_) => Self::Transient(message),
            ApiError::NotFound(_) => Self::NotFound(message),
            ApiError::Client { .. } | ApiError::Decode(_) => Self::Rejected(message),
            ApiError::RetriesExhausted { .. } => Self::RetriesExhausted(message),
        }
    }
}
