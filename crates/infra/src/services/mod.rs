//! Service layer implementations.
//!
//! Services wire the transport, credential manager and resource client
//! together behind one handle.

pub mod postal_service;

pub use postal_service::PostalService;
