//! # diradmin Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the directory API, the token API and scan
//!   state storage
//! - The resumable batch runner that drives domain-wide scans
//! - Token statistics, scope catalogue and revocation planning
//! - User management use cases
//!
//! ## Architecture Principles
//! - Only depends on `diradmin-common` and `diradmin-domain`
//! - No HTTP or filesystem code
//! - All external dependencies via traits

pub mod batch;
pub mod tokens;
pub mod user;

// Re-export specific items to avoid ambiguity
pub use batch::ports::{EntityPage, EntityProcessor, EntitySource, ScanEntity, ScanStore};
pub use batch::runner::{BatchRunner, ScanOptions, ScanRun};
pub use batch::sources::{DomainUserSource, KnownUserSource};
pub use tokens::ports::TokensApi;
pub use tokens::processors::{ClientRevoker, RevocationOutcome, TokenCollector};
pub use tokens::revocation::{revoke_planned, Blacklists, RevocationPlan, RevocationSummary};
pub use tokens::scopes::lookup_scope;
pub use tokens::stats::{build_stat_map, users_for_client, StatMap, TokenGroup, TokenStats};
pub use user::ports::DirectoryApi;
pub use user::service::UserService;
