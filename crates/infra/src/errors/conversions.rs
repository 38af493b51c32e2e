//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use diradmin_domain::DirAdminError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DirAdminError);

impl From<InfraError> for DirAdminError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DirAdminError> for InfraError {
    fn from(value: DirAdminError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDirAdminError {
    fn into_diradmin(self) -> DirAdminError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → DirAdminError */
/* -------------------------------------------------------------------------- */

impl IntoDirAdminError for IoError {
    fn into_diradmin(self) -> DirAdminError {
        match self.kind() {
            ErrorKind::NotFound => DirAdminError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                DirAdminError::Storage(format!("permission denied: {self}"))
            }
            _ => DirAdminError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_diradmin())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → DirAdminError */
/* -------------------------------------------------------------------------- */

impl IntoDirAdminError for JsonError {
    fn into_diradmin(self) -> DirAdminError {
        if self.is_io() {
            DirAdminError::Storage(format!("json i/o failure: {self}"))
        } else {
            DirAdminError::Storage(format!("malformed json (line {}): {self}", self.line()))
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_diradmin())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → DirAdminError */
/* -------------------------------------------------------------------------- */

impl IntoDirAdminError for TomlError {
    fn into_diradmin(self) -> DirAdminError {
        DirAdminError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_diradmin())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
