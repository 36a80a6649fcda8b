//! Resource API error decoding

use postkit_domain::{ApiErrorEnvelope, PostalError};

use crate::http::HttpResponse;

/// Map a response with status >= 400 to `PostalError::Api`
///
/// Bodies that are not the standard envelope are wrapped verbatim.
pub fn decode_api_error(response: &HttpResponse) -> PostalError {
    let envelope = response
        .json::<ApiErrorEnvelope>()
        .ok()
        .filter(|envelope| envelope.error.is_some())
        .unwrap_or_else(|| ApiErrorEnvelope::from_raw(&response.text()));
    PostalError::Api { status: response.status, envelope }
}
