//! Postal client facade.
//!
//! Owns one credential manager, one resource client and one bulk processor,
//! all built from a single [`ClientConfig`]. Cloning is cheap; clones share
//! the token cache.
//!
//! # Example
//!
//! ```no_run
//! use postkit_core::CancelScope;
//! use postkit_domain::CityStateRequest;
//! use postkit_infra::services::PostalService;
//!
//! # async fn example() -> postkit_domain::Result<()> {
//! let service = PostalService::from_env()?;
//! let scope = CancelScope::new();
//!
//! let parsed = service.parse("123 N Main St Apt 4B, New York, NY 10001");
//! let response = service.standardize_address(&scope, &(&parsed.address).into()).await?;
//! println!("{}", response.address.street_address);
//!
//! let city = service.city_state(&scope, &CityStateRequest::new("62704")).await?;
//! println!("{} {}", city.city, city.state);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use postkit_core::{BulkProcessor, CancelScope, PostalApi};
use postkit_domain::{
    AddressRequest, AddressResponse, BulkResult, CityStateRequest, CityStateResponse,
    ClientConfig, ParsedAddress, Result, ZipCodeRequest, ZipCodeResponse,
};
use tracing::info;

use crate::api::PostalClient;
use crate::auth::{OAuthClient, TokenManager};
use crate::config;
use crate::http::{HttpTransport, ReqwestTransport};

#[derive(Debug, Clone)]
pub struct PostalService {
    config: Arc<ClientConfig>,
    client: Arc<PostalClient>,
    bulk: BulkProcessor,
}

impl PostalService {
    /// Build a service over a reqwest transport honoring `config.timeout`
    ///
    /// # Errors
    /// `PostalError::Config` if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::builder().timeout(config.timeout).build()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build a service over a caller-supplied transport
    ///
    /// # Errors
    /// `PostalError::Config` if the configuration is invalid.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;

        let oauth = OAuthClient::new(
            Arc::clone(&transport),
            config.oauth_base_url(),
            config.client_id.clone(),
            config.client_secret.clone(),
        );
        let tokens = Arc::new(TokenManager::new(oauth, &config));
        let client = Arc::new(PostalClient::new(transport, tokens, config.api_base_url()));
        let api: Arc<dyn PostalApi> = client.clone();
        let bulk = BulkProcessor::new(api, config.bulk.clone())?;

        info!(
            environment = %config.environment,
            base_url = config.api_base_url(),
            "postal service ready"
        );
        Ok(Self { config: Arc::new(config), client, bulk })
    }

    /// Build a service from environment variables or a config file
    ///
    /// # Errors
    /// `PostalError::Config` if no usable configuration is found.
    pub fn from_env() -> Result<Self> {
        Self::new(config::load()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        self.client.tokens()
    }

    pub fn client(&self) -> &Arc<PostalClient> {
        &self.client
    }

    /// Parse a free-form address locally; no request is made
    pub fn parse(&self, input: &str) -> ParsedAddress {
        postkit_core::parse(input)
    }

    /// # Errors
    /// Any error from the credential manager or the `/address` endpoint.
    pub async fn standardize_address(
        &self,
        scope: &CancelScope,
        request: &AddressRequest,
    ) -> Result<AddressResponse> {
        self.client.standardize_address(scope, request).await
    }

    /// # Errors
    /// Any error from the credential manager or the `/city-state` endpoint.
    pub async fn city_state(
        &self,
        scope: &CancelScope,
        request: &CityStateRequest,
    ) -> Result<CityStateResponse> {
        self.client.city_state(scope, request).await
    }

    /// # Errors
    /// Any error from the credential manager or the `/zipcode` endpoint.
    pub async fn zip_code(
        &self,
        scope: &CancelScope,
        request: &ZipCodeRequest,
    ) -> Result<ZipCodeResponse> {
        self.client.zip_code(scope, request).await
    }

    pub async fn process_addresses(
        &self,
        scope: &CancelScope,
        requests: Vec<AddressRequest>,
    ) -> Vec<BulkResult<AddressRequest, AddressResponse>> {
        self.bulk.process_addresses(scope, requests).await
    }

    pub async fn process_city_states(
        &self,
        scope: &CancelScope,
        requests: Vec<CityStateRequest>,
    ) -> Vec<BulkResult<CityStateRequest, CityStateResponse>> {
        self.bulk.process_city_states(scope, requests).await
    }

    pub async fn process_zip_codes(
        &self,
        scope: &CancelScope,
        requests: Vec<ZipCodeRequest>,
    ) -> Vec<BulkResult<ZipCodeRequest, ZipCodeResponse>> {
        self.bulk.process_zip_codes(scope, requests).await
    }
}
