//! Shared utilities for the diradmin crates.
//!
//! Cargo features select what gets compiled:
//! - `foundation`: identifier validation (domains, emails, client ids)
//! - `observability`: `tracing` for the modules that log
//! - `runtime`: the retry executor used by every API call

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

#[cfg(feature = "foundation")]
pub mod validation;

#[cfg(feature = "runtime")]
pub mod resilience;

#[cfg(feature = "runtime")]
pub use resilience::{
    Backoff, Jitter, RetryConfig, RetryConfigBuilder, RetryConfigError, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy,
};
#[cfg(feature = "foundation")]
pub use validation::{
    validate_client_id, validate_domain, validate_email, ValidationError, ValidationResult,
};
