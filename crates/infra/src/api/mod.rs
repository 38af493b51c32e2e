//! Directory API adapter
//!
//! - [`ApiClient`]: authenticated JSON calls with bounded retry
//! - [`DirectoryApi`](diradmin_core::DirectoryApi) and
//!   [`TokensApi`](diradmin_core::TokensApi) implemented on top of it
//! - Access token providers (static bearer or refreshed stored credentials)

pub mod auth;
pub mod client;
pub mod directory;
pub mod errors;
pub mod tokens;

pub use auth::{
    AccessTokenProvider, ClientSecrets, RefreshingTokenProvider, StaticTokenProvider,
    StoredCredentials, ACCESS_TOKEN_ENV,
};
pub use client::{ApiClient, ApiClientConfig, ApiRetryPolicy};
pub use errors::{ApiError, ApiErrorCategory};
