//! OAuth 2.0 wire types for the authorization server
//!
//! Grants are modeled as one enum so the encoding rule lives in a single
//! place: client-credentials is sent form-urlencoded, the refresh and
//! authorization-code grants are sent as JSON.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_domain_enum_conversions;

/// Token request sent to `POST /token`
#[derive(Clone, PartialEq, Eq)]
pub enum GrantRequest {
    ClientCredentials {
        client_id: String,
        client_secret: String,
        scope: Option<String>,
    },
    RefreshToken {
        client_id: String,
        client_secret: String,
        refresh_token: String,
        scope: Option<String>,
    },
    AuthorizationCode {
        client_id: String,
        client_secret: String,
        code: String,
        redirect_uri: Option<String>,
        code_verifier: Option<String>,
        scope: Option<String>,
    },
}

impl GrantRequest {
    /// Value of the `grant_type` field
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::ClientCredentials { .. } => "client_credentials",
            Self::RefreshToken { .. } => "refresh_token",
            Self::AuthorizationCode { .. } => "authorization_code",
        }
    }

    /// Only the client-credentials grant uses a form body
    #[must_use]
    pub const fn is_form_encoded(&self) -> bool {
        matches!(self, Self::ClientCredentials { .. })
    }

    /// Body fields in wire order; absent optional fields are skipped
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("grant_type", self.grant_type().to_string())];
        fn push_opt(
            fields: &mut Vec<(&'static str, String)>,
            name: &'static str,
            value: &Option<String>,
        ) {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                fields.push((name, value.to_string()));
            }
        }

        match self {
            Self::ClientCredentials { client_id, client_secret, scope } => {
                fields.push(("client_id", client_id.clone()));
                fields.push(("client_secret", client_secret.clone()));
                push_opt(&mut fields, "scope", scope);
            }
            Self::RefreshToken { client_id, client_secret, refresh_token, scope } => {
                fields.push(("client_id", client_id.clone()));
                fields.push(("client_secret", client_secret.clone()));
                fields.push(("refresh_token", refresh_token.clone()));
                push_opt(&mut fields, "scope", scope);
            }
            Self::AuthorizationCode {
                client_id,
                client_secret,
                code,
                redirect_uri,
                code_verifier,
                scope,
            } => {
                fields.push(("client_id", client_id.clone()));
                fields.push(("client_secret", client_secret.clone()));
                fields.push(("code", code.clone()));
                push_opt(&mut fields, "redirect_uri", redirect_uri);
                push_opt(&mut fields, "code_verifier", code_verifier);
                push_opt(&mut fields, "scope", scope);
            }
        }
        fields
    }

    /// JSON object form of [`GrantRequest::fields`]
    #[must_use]
    pub fn json_body(&self) -> Value {
        let map: Map<String, Value> = self
            .fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), Value::String(value)))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Debug for GrantRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantRequest")
            .field("grant_type", &self.grant_type())
            .finish_non_exhaustive()
    }
}

/// Raw 2xx body from the token endpoint
///
/// Unknown fields (for example `issued_at`, `status`,
/// `refresh_token_expires_in`) are preserved in `extra`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenWireBody {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenWireBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenWireBody")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Bearer credential issued by the authorization server
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds as reported by the server
    pub expires_in: i64,
    pub scope: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub extra: BTreeMap<String, Value>,
}

impl AccessToken {
    /// Value for the `Authorization` header
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("issued_at", &self.issued_at)
            .finish_non_exhaustive()
    }
}

/// Decoded token endpoint response
#[derive(Clone, PartialEq)]
pub enum TokenResponse {
    AccessOnly(AccessToken),
    AccessAndRefresh { access: AccessToken, refresh_token: String },
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessOnly(access) => f.debug_tuple("AccessOnly").field(access).finish(),
            Self::AccessAndRefresh { access, .. } => f
                .debug_struct("AccessAndRefresh")
                .field("access", access)
                .field("refresh_token", &"[REDACTED]")
                .finish(),
        }
    }
}

impl TokenResponse {
    /// Classify a wire body; an empty `refresh_token` counts as absent
    #[must_use]
    pub fn from_wire(body: TokenWireBody, issued_at: DateTime<Utc>) -> Self {
        let access = AccessToken {
            access_token: body.access_token,
            token_type: body.token_type,
            expires_in: body.expires_in,
            scope: body.scope,
            issued_at,
            extra: body.extra,
        };
        match body.refresh_token.filter(|token| !token.is_empty()) {
            Some(refresh_token) => Self::AccessAndRefresh { access, refresh_token },
            None => Self::AccessOnly(access),
        }
    }

    #[must_use]
    pub fn access(&self) -> &AccessToken {
        match self {
            Self::AccessOnly(access) | Self::AccessAndRefresh { access, .. } => access,
        }
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Self::AccessOnly(_) => None,
            Self::AccessAndRefresh { refresh_token, .. } => Some(refresh_token),
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (AccessToken, Option<String>) {
        match self {
            Self::AccessOnly(access) => (access, None),
            Self::AccessAndRefresh { access, refresh_token } => (access, Some(refresh_token)),
        }
    }
}

/// Error body from the authorization server (RFC 6749 section 5.2)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl OAuthErrorBody {
    /// Body synthesized when the server's error response is not JSON
    #[must_use]
    pub fn from_raw(body: &str) -> Self {
        let description = body.trim();
        Self {
            error: "invalid_response".to_string(),
            error_description: (!description.is_empty()).then(|| description.to_string()),
            error_uri: None,
        }
    }
}

impl fmt::Display for OAuthErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = if self.error.is_empty() { "unknown_error" } else { &self.error };
        match &self.error_description {
            Some(desc) => write!(f, "{error}: {desc}"),
            None => f.write_str(error),
        }
    }
}

/// Hint accompanying a revocation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    AccessToken,
    RefreshToken,
}

impl_domain_enum_conversions!(TokenTypeHint {
    AccessToken => "access_token",
    RefreshToken => "refresh_token",
});

/// Body of `POST /revoke`
#[derive(Clone, PartialEq, Eq)]
pub struct RevokeRequest {
    pub token: String,
    pub token_type_hint: Option<TokenTypeHint>,
}

impl RevokeRequest {
    #[must_use]
    pub fn new(token: impl Into<String>, token_type_hint: Option<TokenTypeHint>) -> Self {
        Self { token: token.into(), token_type_hint }
    }

    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("token", self.token.clone())];
        if let Some(hint) = self.token_type_hint {
            fields.push(("token_type_hint", hint.as_str().to_string()));
        }
        fields
    }
}

impl fmt::Debug for RevokeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevokeRequest")
            .field("token", &"[REDACTED]")
            .field("token_type_hint", &self.token_type_hint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> TokenWireBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_client_credentials_fields() {
        let grant = GrantRequest::ClientCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            scope: Some("addresses".into()),
        };
        assert!(grant.is_form_encoded());
        assert_eq!(
            grant.fields(),
            vec![
                ("grant_type", "client_credentials".to_string()),
                ("client_id", "id".to_string()),
                ("client_secret", "secret".to_string()),
                ("scope", "addresses".to_string()),
            ]
        );
    }

    #[test]
    fn test_refresh_grant_is_json() {
        let grant = GrantRequest::RefreshToken {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: "r1".into(),
            scope: None,
        };
        assert!(!grant.is_form_encoded());
        let body = grant.json_body();
        assert_eq!(body["grant_type"], "refresh_token");
        assert_eq!(body["refresh_token"], "r1");
        assert!(body.get("scope").is_none());
    }

    #[test]
    fn test_grant_debug_hides_secrets() {
        let grant = GrantRequest::ClientCredentials {
            client_id: "id".into(),
            client_secret: "hunter2".into(),
            scope: None,
        };
        assert!(!format!("{grant:?}").contains("hunter2"));
    }

    #[test]
    fn test_wire_body_keeps_extra_fields() {
        let body = wire(
            r#"{"access_token":"a","expires_in":3600,"token_type":"Bearer",
                "issued_at":1700000000,"status":"approved"}"#,
        );
        assert_eq!(body.extra.get("status"), Some(&Value::String("approved".into())));
        assert_eq!(body.extra.len(), 2);
    }

    #[test]
    fn test_token_response_classification() {
        let now = Utc::now();
        let only = TokenResponse::from_wire(wire(r#"{"access_token":"a","expires_in":60}"#), now);
        assert!(matches!(only, TokenResponse::AccessOnly(_)));
        assert_eq!(only.access().token_type, "Bearer");

        let empty_refresh = TokenResponse::from_wire(
            wire(r#"{"access_token":"a","expires_in":60,"refresh_token":""}"#),
            now,
        );
        assert!(empty_refresh.refresh_token().is_none());

        let both = TokenResponse::from_wire(
            wire(r#"{"access_token":"a","expires_in":60,"refresh_token":"r"}"#),
            now,
        );
        assert_eq!(both.refresh_token(), Some("r"));
        let (access, refresh) = both.into_parts();
        assert_eq!(access.bearer(), "Bearer a");
        assert_eq!(refresh.as_deref(), Some("r"));
    }

    #[test]
    fn test_oauth_error_display() {
        let body: OAuthErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"expired"}"#)
                .unwrap();
        assert_eq!(body.to_string(), "invalid_grant: expired");
        assert_eq!(OAuthErrorBody::default().to_string(), "unknown_error");
    }

    #[test]
    fn test_revoke_fields() {
        let request = RevokeRequest::new("tok", Some(TokenTypeHint::RefreshToken));
        assert_eq!(
            request.fields(),
            vec![("token", "tok".to_string()), ("token_type_hint", "refresh_token".to_string())]
        );
        assert!(RevokeRequest::new("tok", None).fields().len() == 1);
    }
}
