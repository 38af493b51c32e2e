//! Bounded retry with doubling backoff and jitter.
//!
//! [`RetryExecutor::execute`] runs an async operation until it succeeds,
//! the policy answers [`RetryDecision::Stop`], or `max_attempts` calls have
//! been made. Before retry `n` (0-based) the executor sleeps
//! `min(initial * 2^n, max)` with jitter applied, unless the policy asked
//! for an explicit delay (e.g. from a `Retry-After` header).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; carries the last one
    #[error("gave up after {attempts} attempts: {source}")]
    AttemptsExhausted { attempts: u32, source: E },

    #[error("non-retryable failure: {source}")]
    NonRetryable { source: E },
}

impl<E> RetryError<E> {
    /// The failure returned by the operation, when there was one.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source } => Some(source),
        }
    }
}

/// Rejected [`RetryConfig`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryConfigError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("max delay {max:?} is below the initial delay {initial:?}")]
    DelayCapBelowInitial { initial: Duration, max: Duration },
}

/// Final result of [`RetryExecutor::execute_with_outcome`] plus how much
/// retrying it took.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, RetryError<E>>,
    pub attempts: u32,
    pub total_delay: Duration,
}

/// Maps an operation error to what the executor should do next.
pub trait RetryPolicy<E> {
    /// `attempt` counts failures so far, starting at 0.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the backoff delay
    Retry,
    /// Retry after exactly this delay, bypassing backoff and jitter
    RetryAfter(Duration),
    Stop,
}

/// Doubling delay curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    /// Delay before retry `retry` (0-based), before jitter.
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }

    pub const fn max_delay(&self) -> Duration {
        self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    None,
    /// Uniform in `[0, delay]`
    Full,
    /// Uniform in `[delay / 2, delay]`
    Equal,
}

impl Jitter {
    pub fn apply(self, delay: Duration) -> Duration {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        match self {
            Self::None => delay,
            Self::Full => Duration::from_millis(random_up_to(millis)),
            Self::Equal => {
                let half = millis / 2;
                Duration::from_millis(half + random_up_to(millis - half))
            }
        }
    }
}

fn random_up_to(max: u64) -> u64 {
    if max == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total calls, the first one included
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Backoff { initial: Duration::from_secs(1), max: Duration::from_secs(64) },
            jitter: Jitter::Equal,
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// # Errors
    /// Rejects zero attempts and a cap below the initial delay.
    pub fn validate(&self) -> Result<(), RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError::ZeroAttempts);
        }
        if self.backoff.max < self.backoff.initial {
            return Err(RetryConfigError::DelayCapBelowInitial {
                initial: self.backoff.initial,
                max: self.backoff.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn exponential_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.backoff = Backoff { initial, max };
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    pub fn full_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Full;
        self
    }

    pub fn equal_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Equal;
        self
    }

    /// # Errors
    /// See [`RetryConfig::validate`].
    pub fn build(self) -> Result<RetryConfig, RetryConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Runs operations under a [`RetryConfig`] and a [`RetryPolicy`]. Holds no
/// state between calls.
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation).await.result
    }

    #[instrument(level = "trace", skip_all, fields(max_attempts = self.config.max_attempts))]
    pub async fn execute_with_outcome<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut failures = 0u32;
        let mut total_delay = Duration::ZERO;

        let result = loop {
            let attempt = failures + 1;
            let error = match operation().await {
                Ok(value) => {
                    if failures > 0 {
                        info!(attempt, "succeeded after retrying");
                    }
                    break Ok(value);
                }
                Err(error) => error,
            };

            let delay = match self.policy.should_retry(&error, failures) {
                RetryDecision::Stop => {
                    debug!(attempt, error = %error, "not retryable");
                    break Err(RetryError::NonRetryable { source: error });
                }
                RetryDecision::Retry => {
                    self.config.jitter.apply(self.config.backoff.delay(failures))
                }
                RetryDecision::RetryAfter(delay) => delay,
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, error = %error, "retries exhausted");
                break Err(RetryError::AttemptsExhausted { attempts: attempt, source: error });
            }

            warn!(
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            total_delay += delay;
            failures += 1;
        };

        RetryOutcome { attempts: failures + 1, total_delay, result }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    struct Always;

    impl<E> RetryPolicy<E> for Always {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Retries only errors equal to "transient".
    struct OnlyTransient;

    impl RetryPolicy<&'static str> for OnlyTransient {
        fn should_retry(&self, error: &&'static str, _attempt: u32) -> RetryDecision {
            if *error == "transient" {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }

    struct SlowDown;

    impl RetryPolicy<&'static str> for SlowDown {
        fn should_retry(&self, _error: &&'static str, _attempt: u32) -> RetryDecision {
            RetryDecision::RetryAfter(Duration::from_millis(3))
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::builder()
            .max_attempts(max_attempts)
            .exponential_backoff(Duration::from_millis(1), Duration::from_millis(1))
            .no_jitter()
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_backoff_doubles_up_to_the_cap() {
        let backoff = Backoff { initial: Duration::from_millis(100), max: Duration::from_secs(10) };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(40), Duration::from_secs(10));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_bounds() {
        let delay = Duration::from_millis(1000);
        assert_eq!(Jitter::None.apply(delay), delay);

        for _ in 0..200 {
            assert!(Jitter::Full.apply(delay) <= delay);
            let equal = Jitter::Equal.apply(delay);
            assert!(equal >= Duration::from_millis(500) && equal <= delay);
        }
        assert_eq!(Jitter::Equal.apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_config_validation() {
        let zero = RetryConfig::builder().max_attempts(0).build().unwrap_err();
        assert_eq!(zero, RetryConfigError::ZeroAttempts);
        assert_eq!(zero.to_string(), "max_attempts must be at least 1");

        let inverted = RetryConfig::builder()
            .exponential_backoff(Duration::from_secs(10), Duration::from_secs(1))
            .build()
            .unwrap_err();
        assert!(matches!(inverted, RetryConfigError::DelayCapBelowInitial { .. }));
        assert!(inverted.to_string().contains("below the initial delay"));

        let config = RetryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backoff.max_delay(), Duration::from_secs(64));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let executor = RetryExecutor::new(fast_config(3), Always);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let outcome = executor
            .execute_with_outcome(|| {
                let calls = Arc::clone(&calls_clone);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("temporary failure")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.result.expect("eventually succeeds"), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_the_last_error() {
        let executor = RetryExecutor::new(fast_config(4), Always);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), RetryError<String>> = executor
            .execute(|| {
                let calls = Arc::clone(&calls_clone);
                async move { Err(format!("failure {}", calls.fetch_add(1, Ordering::SeqCst) + 1)) }
            })
            .await;

        match result {
            Err(RetryError::AttemptsExhausted { attempts, source }) => {
                assert_eq!(attempts, 4);
                assert_eq!(source, "failure 4");
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    /// A permanent failure on the last attempt is reported as such, not as
    /// exhaustion.
    #[tokio::test]
    async fn test_policy_is_consulted_before_the_attempt_bound() {
        let executor = RetryExecutor::new(fast_config(2), OnlyTransient);
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), _> = executor
            .execute(|| {
                let calls = Arc::clone(&calls_clone);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err("transient")
                    } else {
                        Err("fatal")
                    }
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::NonRetryable { source: "fatal" })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_after_bypasses_backoff() {
        let config = RetryConfig::builder()
            .max_attempts(3)
            .exponential_backoff(Duration::from_secs(60), Duration::from_secs(60))
            .build()
            .expect("valid config");
        let executor = RetryExecutor::new(config, SlowDown);

        let outcome = executor.execute_with_outcome(|| async { Err::<(), _>("slow down") }).await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.total_delay, Duration::from_millis(6));
        assert!(matches!(outcome.result, Err(RetryError::AttemptsExhausted { attempts: 3, .. })));
    }
}
