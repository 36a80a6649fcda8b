//! Resource endpoint payloads
//!
//! Request types know how to render themselves as query parameters; response
//! types mirror the JSON the service returns. Unknown response fields are
//! ignored so additive server changes do not break decoding.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::address::CanonicalAddress;

/// Append `(name, value)` when the value is non-empty
fn push_param(params: &mut Vec<(&'static str, String)>, name: &'static str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        params.push((name, value.to_string()));
    }
}

/// Address standardization request (`GET /address`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub firm: String,
    pub street_address: String,
    pub secondary_address: String,
    pub city: String,
    pub state: String,
    pub urbanization: String,
    #[serde(rename = "ZIPCode")]
    pub zip_code: String,
    #[serde(rename = "ZIPPlus4")]
    pub zip_plus4: String,
}

impl AddressRequest {
    /// Query parameters in wire order, empty values omitted
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(8);
        push_param(&mut params, "firm", &self.firm);
        push_param(&mut params, "streetAddress", &self.street_address);
        push_param(&mut params, "secondaryAddress", &self.secondary_address);
        push_param(&mut params, "city", &self.city);
        push_param(&mut params, "state", &self.state);
        push_param(&mut params, "urbanization", &self.urbanization);
        push_param(&mut params, "ZIPCode", &self.zip_code);
        push_param(&mut params, "ZIPPlus4", &self.zip_plus4);
        params
    }
}

impl From<&CanonicalAddress> for AddressRequest {
    fn from(address: &CanonicalAddress) -> Self {
        Self {
            firm: address.firm.clone(),
            street_address: address.street_address.clone(),
            secondary_address: address.secondary_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            urbanization: address.urbanization.clone(),
            zip_code: address.zip_code.clone(),
            zip_plus4: address.zip_plus4.clone(),
        }
    }
}

/// City/state lookup request (`GET /city-state`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityStateRequest {
    #[serde(rename = "ZIPCode")]
    pub zip_code: String,
}

impl CityStateRequest {
    #[must_use]
    pub fn new(zip_code: impl Into<String>) -> Self {
        Self { zip_code: zip_code.into() }
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(1);
        push_param(&mut params, "ZIPCode", &self.zip_code);
        params
    }
}

/// ZIP code lookup request (`GET /zipcode`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipCodeRequest {
    pub firm: String,
    pub street_address: String,
    pub secondary_address: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "ZIPCode")]
    pub zip_code: String,
    #[serde(rename = "ZIPPlus4")]
    pub zip_plus4: String,
}

impl ZipCodeRequest {
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(7);
        push_param(&mut params, "firm", &self.firm);
        push_param(&mut params, "streetAddress", &self.street_address);
        push_param(&mut params, "secondaryAddress", &self.secondary_address);
        push_param(&mut params, "city", &self.city);
        push_param(&mut params, "state", &self.state);
        push_param(&mut params, "ZIPCode", &self.zip_code);
        push_param(&mut params, "ZIPPlus4", &self.zip_plus4);
        params
    }
}

impl From<&CanonicalAddress> for ZipCodeRequest {
    fn from(address: &CanonicalAddress) -> Self {
        Self {
            firm: address.firm.clone(),
            street_address: address.street_address.clone(),
            secondary_address: address.secondary_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            zip_plus4: address.zip_plus4.clone(),
        }
    }
}

/// Address block shared by the address and ZIP code responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRecord {
    pub street_address: String,
    pub street_address_abbreviation: Option<String>,
    pub secondary_address: Option<String>,
    pub city: String,
    pub city_abbreviation: Option<String>,
    pub state: String,
    pub urbanization: Option<String>,
    #[serde(rename = "ZIPCode")]
    pub zip_code: String,
    #[serde(rename = "ZIPPlus4")]
    pub zip_plus4: Option<String>,
}

/// Correction hint returned by address standardization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correction {
    pub code: String,
    pub text: String,
}

/// Match indicator returned by address standardization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressMatch {
    pub code: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressResponse {
    pub firm: Option<String>,
    pub address: AddressRecord,
    /// Delivery point and carrier route details, kept untyped
    pub additional_info: Option<Value>,
    pub corrections: Vec<Correction>,
    pub matches: Vec<AddressMatch>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityStateResponse {
    pub city: String,
    pub state: String,
    #[serde(rename = "ZIPCode")]
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipCodeResponse {
    pub firm: Option<String>,
    pub address: AddressRecord,
}

/// Standard error envelope returned by resource endpoints on status >= 400
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiErrorEnvelope {
    pub api_version: Option<String>,
    pub error: Option<ApiErrorBody>,
}

impl ApiErrorEnvelope {
    /// Envelope synthesized when the server's error body is not JSON
    #[must_use]
    pub fn from_raw(body: &str) -> Self {
        let message = body.trim();
        Self {
            api_version: None,
            error: Some(ApiErrorBody {
                code: None,
                message: (!message.is_empty()).then(|| message.to_string()),
                errors: Vec::new(),
            }),
        }
    }

    /// Top-level message, falling back to the first detail entry
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        let body = self.error.as_ref()?;
        body.message.as_deref().or_else(|| {
            body.errors.first().and_then(|d| d.detail.as_deref().or(d.title.as_deref()))
        })
    }
}

impl fmt::Display for ApiErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.error.as_ref().and_then(|e| e.code.as_deref());
        match (code, self.message()) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (Some(code), None) => f.write_str(code),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("no error details"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiErrorDetail {
    pub status: Option<String>,
    pub code: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub source: Option<Value>,
}
