//! Port interface for the postal resource API

use async_trait::async_trait;
use postkit_domain::{
    AddressRequest, AddressResponse, CityStateRequest, CityStateResponse, Result,
    ZipCodeRequest, ZipCodeResponse,
};

use crate::scope::CancelScope;

/// One call per resource endpoint
///
/// Implementations must honor `scope`: once it terminates, an in-flight call
/// resolves with `PostalError::Cancelled`.
#[async_trait]
pub trait PostalApi: Send + Sync {
    /// Standardize an address (`GET /address`)
    async fn standardize_address(
        &self,
        scope: &CancelScope,
        request: &AddressRequest,
    ) -> Result<AddressResponse>;

    /// Look up city and state for a ZIP code (`GET /city-state`)
    async fn city_state(
        &self,
        scope: &CancelScope,
        request: &CityStateRequest,
    ) -> Result<CityStateResponse>;

    /// Look up the ZIP code for an address (`GET /zipcode`)
    async fn zip_code(
        &self,
        scope: &CancelScope,
        request: &ZipCodeRequest,
    ) -> Result<ZipCodeResponse>;
}
