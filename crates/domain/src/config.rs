//! Client configuration records
//!
//! Everything is supplied at construction time; nothing here is global.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_REQUESTS_PER_SECOND,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_BACKOFF, DEFAULT_TOKEN_REFRESH_BUFFER,
    PRODUCTION_API_BASE_URL, PRODUCTION_OAUTH_BASE_URL, TESTING_API_BASE_URL,
    TESTING_OAUTH_BASE_URL,
};
use crate::errors::{PostalError, Result};
use crate::impl_domain_enum_conversions;
use crate::types::bulk::ProgressCallback;

/// Service environment selecting the default base URLs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Testing,
}

impl_domain_enum_conversions!(Environment {
    Production => "production",
    Testing => "testing",
});

impl Environment {
    #[must_use]
    pub const fn api_base_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_API_BASE_URL,
            Self::Testing => TESTING_API_BASE_URL,
        }
    }

    #[must_use]
    pub const fn oauth_base_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_OAUTH_BASE_URL,
            Self::Testing => TESTING_OAUTH_BASE_URL,
        }
    }
}

/// Bulk executor settings
#[derive(Clone)]
pub struct BulkConfig {
    /// Maximum in-flight requests (> 0)
    pub max_concurrency: usize,
    /// Token bucket capacity and refill rate (> 0)
    pub requests_per_second: u32,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay for exponential backoff (> 0)
    pub retry_backoff: Duration,
    pub progress: Option<ProgressCallback>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            progress: None,
        }
    }
}

impl BulkConfig {
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    #[must_use]
    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// # Errors
    /// Returns `PostalError::Config` for zero concurrency, zero rate, or a
    /// zero backoff base.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(PostalError::Config("max_concurrency must be greater than 0".into()));
        }
        if self.requests_per_second == 0 {
            return Err(PostalError::Config("requests_per_second must be greater than 0".into()));
        }
        if self.retry_backoff.is_zero() {
            return Err(PostalError::Config("retry_backoff must be greater than 0".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for BulkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("requests_per_second", &self.requests_per_second)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// Full client configuration
#[derive(Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: Environment,
    /// Overrides the environment's resource base URL
    pub base_url: Option<String>,
    /// Overrides the environment's authorization base URL
    pub oauth_base_url: Option<String>,
    pub timeout: Duration,
    pub scopes: Vec<String>,
    pub token_refresh_buffer: Duration,
    pub use_refresh_tokens: bool,
    pub bulk: BulkConfig,
}

impl ClientConfig {
    #[must_use]
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder::new(client_id, client_secret)
    }

    /// Effective resource base URL without a trailing slash
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.api_base_url())
            .trim_end_matches('/')
    }

    /// Effective authorization base URL without a trailing slash
    #[must_use]
    pub fn oauth_base_url(&self) -> &str {
        self.oauth_base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.oauth_base_url())
            .trim_end_matches('/')
    }

    /// Space separated scope string, `None` when no scopes are configured
    #[must_use]
    pub fn scope_string(&self) -> Option<String> {
        if self.scopes.is_empty() {
            None
        } else {
            Some(self.scopes.join(" "))
        }
    }

    /// # Errors
    /// Returns `PostalError::Config` when credentials are blank, the timeout
    /// is zero, or the bulk settings are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(PostalError::Config("client_id must not be empty".into()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(PostalError::Config("client_secret must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(PostalError::Config("timeout must be greater than 0".into()));
        }
        for (name, url) in [("base_url", &self.base_url), ("oauth_base_url", &self.oauth_base_url)]
        {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(PostalError::Config(format!(
                        "{name} must be an http(s) URL: {url}"
                    )));
                }
            }
        }
        self.bulk.validate()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("oauth_base_url", &self.oauth_base_url)
            .field("timeout", &self.timeout)
            .field("scopes", &self.scopes)
            .field("token_refresh_buffer", &self.token_refresh_buffer)
            .field("use_refresh_tokens", &self.use_refresh_tokens)
            .field("bulk", &self.bulk)
            .finish()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                environment: Environment::default(),
                base_url: None,
                oauth_base_url: None,
                timeout: DEFAULT_REQUEST_TIMEOUT,
                scopes: Vec::new(),
                token_refresh_buffer: DEFAULT_TOKEN_REFRESH_BUFFER,
                use_refresh_tokens: false,
                bulk: BulkConfig::default(),
            },
        }
    }

    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.oauth_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn token_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.config.token_refresh_buffer = buffer;
        self
    }

    #[must_use]
    pub fn use_refresh_tokens(mut self, enabled: bool) -> Self {
        self.config.use_refresh_tokens = enabled;
        self
    }

    #[must_use]
    pub fn bulk(mut self, bulk: BulkConfig) -> Self {
        self.config.bulk = bulk;
        self
    }

    /// # Errors
    /// Returns `PostalError::Config` if [`ClientConfig::validate`] fails.
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
