//! # Postkit Domain
//!
//! Domain types and models for the postal address client.
//!
//! This crate contains:
//! - Canonical address and parser diagnostic records
//! - Endpoint request/response payloads and OAuth wire types
//! - Bulk processing records (results, progress events)
//! - Configuration structures and their defaults
//! - The error taxonomy shared by every other crate
//!
//! ## Architecture
//! - No dependencies on other Postkit crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
