//! Shared test helpers for `postkit-core` integration tests.

pub mod postal;
