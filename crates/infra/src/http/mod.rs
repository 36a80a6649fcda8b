//! HTTP transport seam and its reqwest adapter

pub mod client;
pub mod transport;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
pub use transport::{encode_form, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
