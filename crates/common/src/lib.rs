//! Generic utilities shared across Postkit crates.
//!
//! Nothing in this crate knows about postal addresses or OAuth; domain crates
//! build on these primitives.
//!
//! # Feature Tiers
//!
//! Enable the `runtime` feature for the async resilience primitives (clock,
//! retry, rate limiting). Without it the crate is empty.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

#[cfg(feature = "runtime")]
pub use resilience::{
    BackoffStrategy, Clock, MockClock, ResilienceError, ResilienceResult, RetryConfig,
    RetryDecision, RetryPolicy, SystemClock, TokenBucket,
};
