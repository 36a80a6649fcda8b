//! Error types used throughout the workspace

use std::fmt;

use thiserror::Error;

use crate::types::api::ApiErrorEnvelope;
use crate::types::oauth::OAuthErrorBody;

/// Why a cancellation scope terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The scope was cancelled explicitly
    Cancelled,
    /// The scope's deadline passed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("operation cancelled"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Main error type for Postkit
///
/// Parser problems are never raised through this type; they are reported as
/// diagnostics on the parsed address instead.
#[derive(Error, Debug, Clone)]
pub enum PostalError {
    /// Network, DNS, TLS, connection or I/O failure below HTTP
    #[error("Transport error: {0}")]
    Transport(String),

    /// A resource endpoint answered with status >= 400
    #[error("API error (status {status}): {envelope}")]
    Api { status: u16, envelope: ApiErrorEnvelope },

    /// The authorization server answered with status >= 400
    #[error("OAuth error (status {status}): {envelope}")]
    OAuth { status: u16, envelope: OAuthErrorBody },

    /// The enclosing cancellation scope terminated
    #[error("Cancelled: {0}")]
    Cancelled(CancelReason),

    /// A response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostalError {
    /// Retry predicate for bulk execution
    ///
    /// Transport failures are retryable, as are resource API errors carrying
    /// 429 or any 5xx status. Everything else is terminal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::OAuth { .. }
            | Self::Cancelled(_)
            | Self::Parse(_)
            | Self::Config(_)
            | Self::Internal(_) => false,
        }
    }

    /// HTTP status carried by API and OAuth errors
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::OAuth { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl From<CancelReason> for PostalError {
    fn from(reason: CancelReason) -> Self {
        Self::Cancelled(reason)
    }
}

impl From<serde_json::Error> for PostalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias for Postkit operations
pub type Result<T> = std::result::Result<T, PostalError>;
