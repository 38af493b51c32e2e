//! Resilience patterns for remote calls.
//!
//! Every component that talks to the remote API goes through the single
//! [`RetryExecutor`] defined here. Callers supply a [`RetryPolicy`] that
//! classifies their own error type into retry / retry-after / stop, and a
//! [`RetryConfig`] that bounds the attempts and shapes the backoff curve.
//!
//! The executor never persists anything: attempt counters and computed
//! delays live only for the duration of one call.

pub mod retry;

pub use retry::{
    Backoff, Jitter, RetryConfig, RetryConfigBuilder, RetryConfigError, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy,
};
