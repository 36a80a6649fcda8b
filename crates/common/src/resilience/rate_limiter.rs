//! Token bucket rate limiter shared by concurrent workers
//!
//! The bucket starts full. Refill is computed lazily on every acquisition:
//! whole intervals elapsed since the last refill are converted to tokens and
//! `last_refill` advances by exactly that many intervals, so fractional
//! progress toward the next token is never lost. All state sits behind one
//! mutex which is never held across an await point.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use super::{Clock, ResilienceError, SystemClock};

#[derive(Debug)]
struct BucketState {
    tokens: u64,
    last_refill: Instant,
}

/// Token bucket rate limiter
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use postkit_common::resilience::TokenBucket;
///
/// let limiter = TokenBucket::per_second(5).unwrap();
/// assert!(limiter.try_acquire());
/// assert_eq!(limiter.refill_interval(), Duration::from_millis(200));
/// ```
pub struct TokenBucket<C: Clock = SystemClock> {
    capacity: u64,
    refill_interval: Duration,
    state: Arc<Mutex<BucketState>>,
    clock: Arc<C>,
}

impl TokenBucket<SystemClock> {
    /// Bucket holding `capacity` tokens, one token added per `refill_interval`
    ///
    /// # Errors
    /// Returns `ResilienceError::InvalidConfig` for a zero capacity or
    /// interval.
    pub fn new(capacity: u64, refill_interval: Duration) -> Result<Self, ResilienceError> {
        Self::with_clock(capacity, refill_interval, SystemClock)
    }

    /// Bucket sized for `rate` requests per second: capacity `rate`, one
    /// token every `1/rate` seconds
    ///
    /// # Errors
    /// Returns `ResilienceError::InvalidConfig` when `rate` is zero.
    pub fn per_second(rate: u32) -> Result<Self, ResilienceError> {
        Self::per_second_with_clock(rate, SystemClock)
    }
}

impl<C: Clock> TokenBucket<C> {
    /// # Errors
    /// Returns `ResilienceError::InvalidConfig` for a zero capacity or
    /// interval.
    pub fn with_clock(
        capacity: u64,
        refill_interval: Duration,
        clock: C,
    ) -> Result<Self, ResilienceError> {
        if capacity == 0 {
            return Err(ResilienceError::InvalidConfig("capacity must be greater than 0".into()));
        }
        if refill_interval.is_zero() {
            return Err(ResilienceError::InvalidConfig(
                "refill_interval must be greater than zero".into(),
            ));
        }
        let state = BucketState { tokens: capacity, last_refill: clock.now() };
        Ok(Self {
            capacity,
            refill_interval,
            state: Arc::new(Mutex::new(state)),
            clock: Arc::new(clock),
        })
    }

    /// # Errors
    /// Returns `ResilienceError::InvalidConfig` when `rate` is zero.
    pub fn per_second_with_clock(rate: u32, clock: C) -> Result<Self, ResilienceError> {
        if rate == 0 {
            return Err(ResilienceError::InvalidConfig("rate must be greater than 0".into()));
        }
        let interval = (Duration::from_secs(1) / rate).max(Duration::from_nanos(1));
        Self::with_clock(u64::from(rate), interval, clock)
    }

    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[must_use]
    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    fn refill(&self, state: &mut BucketState) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(state.last_refill);
        let intervals = elapsed.as_nanos() / self.refill_interval.as_nanos();
        if intervals == 0 {
            return;
        }

        let intervals = u64::try_from(intervals).unwrap_or(u64::MAX);
        state.tokens = state.tokens.saturating_add(intervals).min(self.capacity);
        let advance = u32::try_from(intervals)
            .ok()
            .and_then(|n| self.refill_interval.checked_mul(n))
            .unwrap_or(elapsed);
        state.last_refill += advance.min(elapsed);
    }

    /// Take one token if available
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state);
        if state.tokens > 0 {
            state.tokens -= 1;
            trace!(remaining = state.tokens, "rate token acquired");
            true
        } else {
            false
        }
    }

    /// Tokens currently available after refill
    pub fn available_tokens(&self) -> u64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Wait for a token, polling every half interval
    ///
    /// Returns `Err(ResilienceError::Interrupted)` as soon as `stop`
    /// completes while waiting.
    ///
    /// # Errors
    /// `ResilienceError::Interrupted` when `stop` resolves first.
    pub async fn acquire_or_stop<F>(&self, stop: F) -> Result<(), ResilienceError>
    where
        F: Future,
    {
        if self.try_acquire() {
            return Ok(());
        }

        let poll = (self.refill_interval / 2).max(Duration::from_millis(1));
        tokio::pin!(stop);
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => return Err(ResilienceError::Interrupted),
                () = tokio::time::sleep(poll) => {}
            }
            if self.try_acquire() {
                return Ok(());
            }
        }
    }

    /// Wait for a token without a stop condition
    pub async fn acquire(&self) {
        // A pending future never stops the wait.
        let _ = self.acquire_or_stop(std::future::pending::<()>()).await;
    }
}

impl<C: Clock> Clone for TokenBucket<C> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            refill_interval: self.refill_interval,
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> std::fmt::Debug for TokenBucket<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucket")
            .field("capacity", &self.capacity)
            .field("refill_interval", &self.refill_interval)
            .field("tokens", &self.state.lock().tokens)
            .finish()
    }
}
