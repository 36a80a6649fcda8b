//! Retry decisions and backoff schedules
//!
//! The retry loop itself belongs to the caller, which also has to interleave
//! rate limiting and cancellation. This module only answers two questions:
//! should this error be retried, and how long to wait before the next attempt.

use std::time::Duration;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after `error` on the zero-based `attempt`
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the schedule's backoff delay
    Retry,
    /// Give up and surface the error
    Stop,
}

/// Exponential backoff: `base * 2^min(attempt, max_exponent)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffStrategy {
    pub base: Duration,
    pub max_exponent: u32,
}

impl BackoffStrategy {
    #[must_use]
    pub const fn exponential(base: Duration, max_exponent: u32) -> Self {
        Self { base, max_exponent }
    }

    /// Delay to wait after the zero-based `attempt` failed
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(self.max_exponent).min(31);
        self.base.saturating_mul(1u32 << exponent)
    }
}

/// Attempt budget plus backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff: BackoffStrategy,
}

impl RetryConfig {
    #[must_use]
    pub const fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self { max_retries, backoff }
    }

    /// Total attempts including the first
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    #[must_use]
    pub const fn has_remaining(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay before the attempt following `attempt`, or `None` when the
    /// budget is spent or the policy says stop
    pub fn next_delay<E, P>(&self, policy: &P, error: &E, attempt: u32) -> Option<Duration>
    where
        P: RetryPolicy<E> + ?Sized,
    {
        if !self.has_remaining(attempt) {
            return None;
        }
        match policy.should_retry(error, attempt) {
            RetryDecision::Retry => Some(self.backoff.calculate_delay(attempt)),
            RetryDecision::Stop => None,
        }
    }
}

/// Pre-defined retry policies
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Retries whenever the predicate holds
    #[derive(Debug, Clone, Copy)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub const fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E) -> bool,
    {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if (self.predicate)(error) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
