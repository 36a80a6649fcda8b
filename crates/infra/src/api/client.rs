//! Typed client for `/address`, `/city-state` and `/zipcode`

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use postkit_common::{Clock, SystemClock};
use postkit_core::{CancelScope, PostalApi};
use postkit_domain::constants::{ADDRESS_PATH, CITY_STATE_PATH, ZIP_CODE_PATH};
use postkit_domain::{
    AddressRequest, AddressResponse, CityStateRequest, CityStateResponse, PostalError, Result,
    ZipCodeRequest, ZipCodeResponse,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::errors::decode_api_error;
use crate::auth::TokenManager;
use crate::errors::InfraError;
use crate::http::{HttpRequest, HttpTransport};

/// Resource API client implementing [`PostalApi`]
pub struct PostalClient<C: Clock = SystemClock> {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenManager<C>>,
    base_url: String,
}

impl<C: Clock> PostalClient<C> {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenManager<C>>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { transport, tokens, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenManager<C>> {
        &self.tokens
    }

    fn endpoint(&self, path: &str, params: &[(&'static str, String)]) -> Result<String> {
        let url = Url::parse_with_params(&format!("{}{path}", self.base_url), params)
            .map_err(|err| PostalError::from(InfraError::from(err)))?;
        Ok(url.into())
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        scope: &CancelScope,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        let url = self.endpoint(path, &params)?;
        let token = self.tokens.get_token(scope).await?;
        let request = HttpRequest::get(url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/json");

        let response = scope.run(self.transport.send(request)).await??;
        debug!(status = response.status, "resource response");
        if response.status == 401 {
            self.tokens.invalidate_if_current(&token).await;
        }
        if !response.is_success() {
            return Err(decode_api_error(&response));
        }
        response.json()
    }
}

#[async_trait]
impl<C: Clock> PostalApi for PostalClient<C> {
    async fn standardize_address(
        &self,
        scope: &CancelScope,
        request: &AddressRequest,
    ) -> Result<AddressResponse> {
        self.get_json(scope, ADDRESS_PATH, request.query_pairs()).await
    }

    async fn city_state(
        &self,
        scope: &CancelScope,
        request: &CityStateRequest,
    ) -> Result<CityStateResponse> {
        self.get_json(scope, CITY_STATE_PATH, request.query_pairs()).await
    }

    async fn zip_code(
        &self,
        scope: &CancelScope,
        request: &ZipCodeRequest,
    ) -> Result<ZipCodeResponse> {
        self.get_json(scope, ZIP_CODE_PATH, request.query_pairs()).await
    }
}

impl<C: Clock> fmt::Debug for PostalClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostalClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
