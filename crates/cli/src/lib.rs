//! # diradmin CLI
//!
//! Command line front end: argument parsing, logging setup, the per-command
//! session and plain-text reports. User-facing output goes to stdout; logs go
//! to stderr and the work dir log file.

#![allow(clippy::print_stdout)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod report;
pub mod session;

pub use cli::{Cli, Command};
pub use commands::{run, Outcome};
