//! OAuth 2.0 client and credential manager
//!
//! `OAuthClient` speaks the authorization server's wire protocol.
//! `TokenManager` caches one bearer token and decides when to fetch a new one.

pub mod client;
pub mod token_manager;

pub use client::OAuthClient;
pub use token_manager::{refresh_deadline, TokenManager, TokenSnapshot};
