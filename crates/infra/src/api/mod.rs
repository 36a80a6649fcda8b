//! Resource API client for the address endpoints
//!
//! Every call asks the token manager for a bearer token, sends one GET and
//! decodes either the typed response or the service's error envelope. The
//! client never retries; the bulk executor owns retries.

pub mod client;
pub mod errors;

pub use client::PostalClient;
pub use errors::decode_api_error;
