//! Conversions from external infrastructure errors into domain errors.

use postkit_domain::PostalError;
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PostalError);

impl From<InfraError> for PostalError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PostalError> for InfraError {
    fn from(value: PostalError) -> Self {
        InfraError(value)
    }
}

trait IntoPostalError {
    fn into_postal(self) -> PostalError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PostalError */
/* -------------------------------------------------------------------------- */

impl IntoPostalError for HttpError {
    fn into_postal(self) -> PostalError {
        if self.is_timeout() {
            return PostalError::Transport("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return PostalError::Transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return PostalError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return PostalError::Parse(format!("failed to decode HTTP body: {self}"));
        }

        PostalError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_postal())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → PostalError */
/* -------------------------------------------------------------------------- */

impl IntoPostalError for UrlError {
    fn into_postal(self) -> PostalError {
        PostalError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_postal())
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::Client;

    use super::*;

    #[tokio::test]
    async fn refused_connection_maps_to_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: PostalError = InfraError::from(error).into();
        assert!(matches!(mapped, PostalError::Transport(_)), "got {mapped:?}");
        assert!(mapped.is_retryable());
    }

    #[test]
    fn bad_url_maps_to_config_error() {
        let error = url::Url::parse("not a url").unwrap_err();
        let mapped: PostalError = InfraError::from(error).into();
        assert!(matches!(mapped, PostalError::Config(_)));
    }
}
