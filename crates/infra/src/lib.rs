//! # Postkit Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The HTTP transport seam and its reqwest adapter
//! - The OAuth client and bearer token manager
//! - The resource API client implementing `postkit_core::PostalApi`
//! - Configuration loading and tracing setup
//! - The `PostalService` facade
//!
//! ## Architecture
//! - Implements traits defined in `postkit-core`
//! - Depends on `postkit-domain`, `postkit-common` and `postkit-core`
//! - Contains all "impure" code (network I/O, environment, files)

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod services;

// Re-export commonly used items
pub use api::PostalClient;
pub use auth::{OAuthClient, TokenManager, TokenSnapshot};
pub use errors::InfraError;
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use services::PostalService;
