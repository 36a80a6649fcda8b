//! Authorization server client

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use postkit_core::CancelScope;
use postkit_domain::constants::{REVOKE_PATH, TOKEN_PATH};
use postkit_domain::{
    GrantRequest, OAuthErrorBody, PostalError, Result, RevokeRequest, TokenResponse, TokenWireBody,
};
use tracing::{debug, instrument};

use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Client for `POST /token` and `POST /revoke`
#[derive(Clone)]
pub struct OAuthClient {
    transport: Arc<dyn HttpTransport>,
    token_url: String,
    revoke_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        oauth_base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let base = oauth_base_url.trim_end_matches('/');
        Self {
            transport,
            token_url: format!("{base}{TOKEN_PATH}"),
            revoke_url: format!("{base}{REVOKE_PATH}"),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_credentials_grant(&self, scope: Option<String>) -> GrantRequest {
        GrantRequest::ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scope,
        }
    }

    pub fn refresh_grant(
        &self,
        refresh_token: impl Into<String>,
        scope: Option<String>,
    ) -> GrantRequest {
        GrantRequest::RefreshToken {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: refresh_token.into(),
            scope,
        }
    }

    pub fn authorization_code_grant(
        &self,
        code: impl Into<String>,
        redirect_uri: Option<String>,
        code_verifier: Option<String>,
        scope: Option<String>,
    ) -> GrantRequest {
        GrantRequest::AuthorizationCode {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            code: code.into(),
            redirect_uri,
            code_verifier,
            scope,
        }
    }

    /// Run a grant against the token endpoint
    ///
    /// Client-credentials goes out form-urlencoded; the other grants as JSON.
    ///
    /// # Errors
    /// - `PostalError::OAuth` when the server answers with status >= 400
    /// - `PostalError::Parse` when a 2xx body is not a token response
    /// - `PostalError::Transport` or `PostalError::Cancelled` from the call
    #[instrument(skip_all, fields(grant_type = grant.grant_type()))]
    pub async fn post_token(
        &self,
        scope: &CancelScope,
        grant: &GrantRequest,
    ) -> Result<TokenResponse> {
        let request = HttpRequest::post(&self.token_url).header("Accept", "application/json");
        let request = if grant.is_form_encoded() {
            request.form(&grant.fields())
        } else {
            request.json(&grant.json_body())?
        };

        let response = scope.run(self.transport.send(request)).await??;
        if !response.is_success() {
            return Err(oauth_error(&response));
        }

        let body: TokenWireBody = response.json()?;
        let token = TokenResponse::from_wire(body, Utc::now());
        debug!(
            expires_in = token.access().expires_in,
            has_refresh_token = token.refresh_token().is_some(),
            "token issued"
        );
        Ok(token)
    }

    /// Revoke a token (RFC 7009) using HTTP Basic client authentication
    ///
    /// # Errors
    /// Same classes as [`OAuthClient::post_token`].
    #[instrument(skip_all, fields(hint = ?revoke.token_type_hint))]
    pub async fn revoke(&self, scope: &CancelScope, revoke: &RevokeRequest) -> Result<()> {
        let request = HttpRequest::post(&self.revoke_url)
            .header("Authorization", self.basic_auth())
            .form(&revoke.fields());

        let response = scope.run(self.transport.send(request)).await??;
        if !response.is_success() {
            return Err(oauth_error(&response));
        }
        debug!("token revoked");
        Ok(())
    }

    fn basic_auth(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("token_url", &self.token_url)
            .field("revoke_url", &self.revoke_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Decode an error response, synthesizing a body when it is not JSON
fn oauth_error(response: &HttpResponse) -> PostalError {
    let envelope = response
        .json::<OAuthErrorBody>()
        .ok()
        .filter(|body| !body.error.is_empty())
        .unwrap_or_else(|| OAuthErrorBody::from_raw(&response.text()));
    PostalError::OAuth { status: response.status, envelope }
}
