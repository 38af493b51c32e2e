//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_status_conversions;

/// How a failure affects a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Network failure, throttling or a 5xx; retried inside the API client.
    Transient,
    /// The remote rejected this one entity; record it and continue.
    EntityFatal,
    /// Credentials, configuration or local storage are broken; abort.
    ScanFatal,
}

impl_status_conversions!(ErrorClass {
    Transient => "transient",
    EntityFatal => "entity_fatal",
    ScanFatal => "scan_fatal",
});

/// Main error type for diradmin
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DirAdminError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Retries exhausted: {0}")]
    RetriesExhausted(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DirAdminError {
    /// Classify the error for retry and abort decisions.
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Transient(_) => ErrorClass::Transient,
            Self::Rejected(_)
            | Self::RetriesExhausted(_)
            | Self::NotFound(_)
            | Self::AlreadyExists(_) => ErrorClass::EntityFatal,
            Self::Config(_)
            | Self::Auth(_)
            | Self::InvalidInput(_)
            | Self::Storage(_)
            | Self::Internal(_) => ErrorClass::ScanFatal,
        }
    }

    /// Short label used in structured logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::Transient(_) => "transient",
            Self::Rejected(_) => "rejected",
            Self::RetriesExhausted(_) => "retries_exhausted",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidInput(_) => "invalid_input",
            Self::Storage(_) => "storage",
            Self::Internal(_) => "internal",
        }
    }

    pub const fn is_scan_fatal(&self) -> bool {
        matches!(self.class(), ErrorClass::ScanFatal)
    }
}

impl From<std::io::Error> for DirAdminError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for diradmin operations
pub type Result<T> = std::result::Result<T, DirAdminError>;
