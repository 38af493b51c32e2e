//! # diradmin Infrastructure
//!
//! Implementations of the `diradmin-core` ports and the other impure pieces
//! of the toolkit.
//!
//! This crate contains:
//! - The directory API client (HTTP transport, auth, bounded retry)
//! - Configuration loading
//! - Local JSON/CSV storage under the working directory
//!
//! ## Architecture
//! - Implements traits defined in `diradmin-core`
//! - Depends on `diradmin-common` and `diradmin-domain`
//! - Contains all I/O

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, ApiClient, ApiClientConfig, ApiError, RefreshingTokenProvider,
    StaticTokenProvider,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use storage::{DomainDefaults, JsonScanStore, WorkDir};
