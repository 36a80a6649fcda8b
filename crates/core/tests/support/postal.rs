//! In-memory `PostalApi` with scripted outcomes

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use postkit_core::{CancelScope, PostalApi};
use postkit_domain::{
    AddressRecord, AddressRequest, AddressResponse, ApiErrorEnvelope, CityStateRequest,
    CityStateResponse, PostalError, Result as DomainResult, ZipCodeRequest, ZipCodeResponse,
};

/// Pops one scripted outcome per call and echoes the request when the
/// script runs out.
#[derive(Default)]
pub struct ScriptedPostalApi {
    script: Mutex<VecDeque<Option<u16>>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedPostalApi {
    /// Each entry is `None` for success or `Some(status)` for an API error
    pub fn new(script: impl IntoIterator<Item = Option<u16>>) -> Self {
        Self { script: Mutex::new(script.into_iter().collect()), ..Self::default() }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next_outcome(&self, scope: &CancelScope) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            scope.sleep(self.latency).await?;
        }
        match self.script.lock().unwrap().pop_front().flatten() {
            Some(status) => Err(api_error(status)),
            None => Ok(()),
        }
    }
}

pub fn api_error(status: u16) -> PostalError {
    PostalError::Api { status, envelope: ApiErrorEnvelope::from_raw("scripted") }
}

#[async_trait]
impl PostalApi for ScriptedPostalApi {
    async fn standardize_address(
        &self,
        scope: &CancelScope,
        request: &AddressRequest,
    ) -> DomainResult<AddressResponse> {
        self.next_outcome(scope).await?;
        Ok(AddressResponse {
            address: AddressRecord {
                street_address: request.street_address.to_uppercase(),
                city: request.city.to_uppercase(),
                state: request.state.to_uppercase(),
                zip_code: request.zip_code.clone(),
                ..AddressRecord::default()
            },
            ..AddressResponse::default()
        })
    }

    async fn city_state(
        &self,
        scope: &CancelScope,
        request: &CityStateRequest,
    ) -> DomainResult<CityStateResponse> {
        self.next_outcome(scope).await?;
        Ok(CityStateResponse {
            city: "SPRINGFIELD".into(),
            state: "IL".into(),
            zip_code: request.zip_code.clone(),
        })
    }

    async fn zip_code(
        &self,
        scope: &CancelScope,
        request: &ZipCodeRequest,
    ) -> DomainResult<ZipCodeResponse> {
        self.next_outcome(scope).await?;
        Ok(ZipCodeResponse {
            firm: None,
            address: AddressRecord {
                street_address: request.street_address.to_uppercase(),
                zip_code: "62704".into(),
                zip_plus4: Some("1234".into()),
                ..AddressRecord::default()
            },
        })
    }
}
