//! Shared test helpers for `diradmin-core` integration tests.
//!
//! In-memory implementations of the core ports so scan tests can focus on
//! behaviour instead of boilerplate.

pub mod fakes;
