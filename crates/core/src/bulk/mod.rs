//! Bulk execution against the postal API
//!
//! The executor is generic over the per-request operation; the processor
//! binds it to the three `PostalApi` endpoints.

pub mod executor;
pub mod ports;
pub mod processor;

pub use executor::BulkExecutor;
pub use ports::PostalApi;
pub use processor::BulkProcessor;
