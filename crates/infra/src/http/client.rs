use std::time::Duration;

use async_trait::async_trait;
use postkit_domain::constants::{DEFAULT_REQUEST_TIMEOUT, USER_AGENT};
use postkit_domain::{PostalError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use tracing::debug;

use super::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::errors::InfraError;

/// [`HttpTransport`] backed by a shared reqwest client.
///
/// Single attempt per call; retries belong to the bulk executor.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        debug!(%method, url = %request.url, "sending HTTP request");

        let mut builder = self.client.request(method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            debug!(%method, url = %request.url, error = %err, "HTTP request failed");
            PostalError::from(InfraError::from(err))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(|err| PostalError::from(InfraError::from(err)))?;
        debug!(%method, url = %request.url, status, "received HTTP response");

        Ok(HttpResponse { status, headers, body: body.to_vec() })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: HeaderMap,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: Some(USER_AGENT.to_string()),
            default_headers: HeaderMap::new(),
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// Add one default header sent with every request.
    ///
    /// # Errors
    /// Returns `PostalError::Config` if the name or value is not a valid
    /// header.
    pub fn default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| PostalError::Config(format!("invalid header name '{name}': {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| PostalError::Config(format!("invalid header value: {err}")))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| PostalError::from(InfraError::from(err)))?;
        Ok(ReqwestTransport { client })
    }
}
