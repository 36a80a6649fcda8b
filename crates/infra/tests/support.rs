//! Shared wiremock fixtures for the infra integration tests

#![allow(dead_code)]

use std::time::Duration;

use postkit_domain::{BulkConfig, ClientConfig, ClientConfigBuilder};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth2/v3/token";
pub const REVOKE_PATH: &str = "/oauth2/v3/revoke";
pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";

/// Config pointing both base URLs at `server`
pub fn config_builder(server: &MockServer) -> ClientConfigBuilder {
    ClientConfig::builder(CLIENT_ID, CLIENT_SECRET)
        .base_url(format!("{}/addresses/v3", server.uri()))
        .oauth_base_url(format!("{}/oauth2/v3", server.uri()))
        .timeout(Duration::from_secs(5))
}

/// Bulk settings fast enough for tests
pub fn fast_bulk() -> BulkConfig {
    BulkConfig::default()
        .with_max_concurrency(4)
        .with_requests_per_second(50)
        .with_retry_backoff(Duration::from_millis(10))
}

pub fn token_body(access: &str, expires_in: i64, refresh: Option<&str>) -> Value {
    let mut body = json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "addresses",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = Value::String(refresh.to_string());
    }
    body
}

/// Client-credentials endpoint answering with one long-lived token
pub async fn mount_client_credentials(server: &MockServer, access: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access, 3600, None)))
        .mount(server)
        .await;
}
