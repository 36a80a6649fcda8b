//! Domain types and models

pub mod address;
pub mod api;
pub mod bulk;
pub mod oauth;

pub use address::{
    CanonicalAddress, Diagnostic, DiagnosticCode, ParsedAddress, Severity, Span,
};
pub use api::{
    AddressMatch, AddressRecord, AddressRequest, AddressResponse, ApiErrorBody, ApiErrorDetail,
    ApiErrorEnvelope, CityStateRequest, CityStateResponse, Correction, ZipCodeRequest,
    ZipCodeResponse,
};
pub use bulk::{BulkOutcome, BulkProgress, BulkResult, ProgressCallback};
pub use oauth::{
    AccessToken, GrantRequest, OAuthErrorBody, RevokeRequest, TokenResponse, TokenTypeHint,
    TokenWireBody,
};
