//! # Postkit Core
//!
//! Pure business logic layer - no HTTP or configuration loading.
//!
//! This crate contains:
//! - The segment-based address parser
//! - Cooperative cancellation scopes
//! - The bulk executor and the `PostalApi` port it drives
//!
//! ## Architecture Principles
//! - Only depends on `postkit-common` and `postkit-domain`
//! - All remote calls go through the `PostalApi` trait
//! - Pure, testable business logic

pub mod address;
pub mod bulk;
pub mod scope;

pub use address::parse;
pub use bulk::{BulkExecutor, BulkProcessor, PostalApi};
pub use scope::CancelScope;
