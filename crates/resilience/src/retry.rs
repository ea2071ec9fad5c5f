// crates/resilience/src/retry.rs
//! Retry policies with optional exponential backoff

use crate::error::{ResilienceError, RetryError};
use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first attempt)
    max_attempts: usize,
    /// Initial delay between retries
    initial_delay: Duration,
    /// Maximum delay between retries
    max_delay: Duration,
    /// Backoff multiplier
    multiplier: f64,
}

impl RetryPolicy {
    /// Creates a new retry policy with exponential backoff from 100ms
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Creates a policy that retries straight away, with no delay
    pub fn immediate(max_attempts: usize) -> Self {
        Self::new(max_attempts).with_initial_delay(Duration::ZERO)
    }

    /// Sets the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Calculates the delay before the given retry (1-based)
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_millis() as f64
            * self.multiplier.powi((attempt - 1) as i32);

        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_delay as u64)
    }

    /// Returns the maximum number of attempts
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::immediate(3)
    }
}

/// Executes an operation, retrying every failure until the policy's bound
pub fn with_retry<F, T, E>(policy: &RetryPolicy, operation: F) -> Result<T, ResilienceError>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
{
    with_retry_when(policy, operation, |_| true).map_err(ResilienceError::from)
}

/// Executes an operation, retrying only failures for which `should_retry` holds
///
/// A failure the predicate rejects ends the loop at once with
/// [`RetryError::Aborted`]. A policy with zero attempts still runs the
/// operation once.
pub fn with_retry_when<F, P, T, E>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts().max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => {
                log::debug!("Attempt {} failed with non-retryable error: {}", attempt, e);
                return Err(RetryError::Aborted { attempts: attempt, error: e });
            }
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }

                log::debug!("Attempt {}/{} failed: {}, retrying", attempt, max_attempts, e);
                let delay = policy.delay_for_attempt(attempt);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }
    }
}
