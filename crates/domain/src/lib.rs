//! # diradmin Domain
//!
//! Data types shared by every layer of the toolkit.
//!
//! This crate contains:
//! - Directory users, OAuth tokens and their wire shapes
//! - Scan state (cursor + result cache) persisted by resumable batch runs
//! - Configuration structures with their defaults
//! - The top-level error type and its retry/abort classification
//!
//! ## Architecture
//! - No dependencies on other diradmin crates
//! - Pure data and small invariants, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
