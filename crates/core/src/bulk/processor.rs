//! Bulk operations bound to the postal resource endpoints

use std::sync::Arc;

use postkit_domain::{
    AddressRequest, AddressResponse, BulkConfig, BulkResult, CityStateRequest,
    CityStateResponse, Result, ZipCodeRequest, ZipCodeResponse,
};
use tracing::instrument;

use super::executor::BulkExecutor;
use super::ports::PostalApi;
use crate::scope::CancelScope;

/// Runs batches of endpoint requests through a [`BulkExecutor`]
#[derive(Clone)]
pub struct BulkProcessor {
    api: Arc<dyn PostalApi>,
    executor: BulkExecutor,
}

impl BulkProcessor {
    /// # Errors
    /// Returns `PostalError::Config` if `config` is invalid.
    pub fn new(api: Arc<dyn PostalApi>, config: BulkConfig) -> Result<Self> {
        Ok(Self { api, executor: BulkExecutor::new(config)? })
    }

    #[must_use]
    pub fn executor(&self) -> &BulkExecutor {
        &self.executor
    }

    #[instrument(skip_all, fields(count = requests.len()))]
    pub async fn process_addresses(
        &self,
        scope: &CancelScope,
        requests: Vec<AddressRequest>,
    ) -> Vec<BulkResult<AddressRequest, AddressResponse>> {
        let api = Arc::clone(&self.api);
        self.executor
            .execute(scope, requests, move |scope, request| {
                let api = Arc::clone(&api);
                async move { api.standardize_address(&scope, &request).await }
            })
            .await
    }

    #[instrument(skip_all, fields(count = requests.len()))]
    pub async fn process_city_states(
        &self,
        scope: &CancelScope,
        requests: Vec<CityStateRequest>,
    ) -> Vec<BulkResult<CityStateRequest, CityStateResponse>> {
        let api = Arc::clone(&self.api);
        self.executor
            .execute(scope, requests, move |scope, request| {
                let api = Arc::clone(&api);
                async move { api.city_state(&scope, &request).await }
            })
            .await
    }

    #[instrument(skip_all, fields(count = requests.len()))]
    pub async fn process_zip_codes(
        &self,
        scope: &CancelScope,
        requests: Vec<ZipCodeRequest>,
    ) -> Vec<BulkResult<ZipCodeRequest, ZipCodeResponse>> {
        let api = Arc::clone(&self.api);
        self.executor
            .execute(scope, requests, move |scope, request| {
                let api = Arc::clone(&api);
                async move { api.zip_code(&scope, &request).await }
            })
            .await
    }
}

impl std::fmt::Debug for BulkProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkProcessor").field("executor", &self.executor).finish_non_exhaustive()
    }
}
