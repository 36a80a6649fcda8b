//! Resilience primitives for talking to rate-limited remote services
//!
//! These are generic building blocks with no knowledge of the postal domain:
//! - **Clock**: time abstraction with a hand-driven mock for tests
//! - **Retry**: retry decisions and capped exponential backoff schedules
//! - **Rate limiting**: a token bucket that can be awaited with a stop signal
//!
//! Callers own the retry loop so they can interleave rate limiting and
//! cancellation between attempts.

pub mod clock;
pub mod rate_limiter;
pub mod retry;

use thiserror::Error;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limiter::TokenBucket;
pub use retry::{policies, BackoffStrategy, RetryConfig, RetryDecision, RetryPolicy};

/// Errors raised by resilience primitives
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A wait was abandoned because its stop signal fired
    #[error("wait interrupted")]
    Interrupted,
}

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;
