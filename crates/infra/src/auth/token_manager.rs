//! Bearer token cache with double-checked refresh
//!
//! Readers take the read lock and return the cached token while it is inside
//! its validity window. The first caller past the window upgrades to the
//! write lock, checks again, and fetches a replacement; concurrent callers
//! wait on the write lock and then observe the fresh token.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use postkit_common::{Clock, SystemClock};
use postkit_core::CancelScope;
use postkit_domain::constants::MIN_TOKEN_LIFETIME;
use postkit_domain::{
    AccessToken, ClientConfig, Result, RevokeRequest, TokenResponse, TokenTypeHint,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::client::OAuthClient;

/// Instant after which a token issued at `now` must be replaced
///
/// Non-positive lifetimes expire immediately. A buffer that swallows the
/// whole lifetime still leaves the token one second of use.
#[must_use]
pub fn refresh_deadline(now: Instant, expires_in: i64, buffer: Duration) -> Instant {
    let Ok(seconds) = u64::try_from(expires_in) else {
        return now;
    };
    if seconds == 0 {
        return now;
    }
    let lifetime = Duration::from_secs(seconds);
    if buffer >= lifetime {
        now + MIN_TOKEN_LIFETIME
    } else {
        now + (lifetime - buffer)
    }
}

#[derive(Default)]
struct TokenState {
    access: Option<AccessToken>,
    refresh_at: Option<Instant>,
    refresh_token: Option<String>,
}

impl TokenState {
    fn usable(&self, now: Instant) -> Option<&AccessToken> {
        match (&self.access, self.refresh_at) {
            (Some(access), Some(refresh_at)) if now < refresh_at => Some(access),
            _ => None,
        }
    }
}

/// Observable cache state, free of secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub has_access_token: bool,
    /// When the cached token was issued (UTC)
    pub issued_at: Option<DateTime<Utc>>,
    /// Lifetime the server granted, in seconds
    pub expires_in: Option<i64>,
    pub has_refresh_token: bool,
    /// Time left before the cached token is replaced
    pub refresh_in: Option<Duration>,
}

/// Holds at most one bearer token and, optionally, one refresh token
pub struct TokenManager<C: Clock = SystemClock> {
    oauth: OAuthClient,
    scopes: Option<String>,
    buffer: Duration,
    use_refresh_tokens: bool,
    clock: C,
    state: RwLock<TokenState>,
}

impl TokenManager<SystemClock> {
    pub fn new(oauth: OAuthClient, config: &ClientConfig) -> Self {
        Self::with_clock(oauth, config, SystemClock)
    }
}

impl<C: Clock> TokenManager<C> {
    pub fn with_clock(oauth: OAuthClient, config: &ClientConfig, clock: C) -> Self {
        Self {
            oauth,
            scopes: config.scope_string(),
            buffer: config.token_refresh_buffer,
            use_refresh_tokens: config.use_refresh_tokens,
            clock,
            state: RwLock::new(TokenState::default()),
        }
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Return a token usable now, fetching one if needed
    ///
    /// With refresh tokens enabled and one stored, the refresh grant is tried
    /// first; if it fails the manager falls back to client credentials once.
    ///
    /// # Errors
    /// OAuth, transport, parse and cancellation errors from the token
    /// endpoint, unchanged.
    #[instrument(skip_all)]
    pub async fn get_token(&self, scope: &CancelScope) -> Result<String> {
        {
            let state = self.state.read().await;
            if let Some(access) = state.usable(self.clock.now()) {
                return Ok(access.access_token.clone());
            }
        }

        let mut state = scope.run(self.state.write()).await?;
        if let Some(access) = state.usable(self.clock.now()) {
            return Ok(access.access_token.clone());
        }

        if self.use_refresh_tokens {
            if let Some(refresh_token) = state.refresh_token.clone() {
                let grant = self.oauth.refresh_grant(refresh_token, self.scopes.clone());
                match self.oauth.post_token(scope, &grant).await {
                    Ok(response) => {
                        debug!("access token renewed with refresh token");
                        return Ok(self.store(&mut state, response, true));
                    }
                    Err(err) if err.is_cancelled() => return Err(err),
                    Err(err) => {
                        warn!(
                            error = %err,
                            "refresh grant failed, falling back to client credentials"
                        );
                    }
                }
            }
        }

        let grant = self.oauth.client_credentials_grant(self.scopes.clone());
        let response = self.oauth.post_token(scope, &grant).await?;
        info!("access token obtained with client credentials");
        Ok(self.store(&mut state, response, false))
    }

    /// Replace the cached credentials with a response obtained elsewhere,
    /// for example from an authorization-code exchange
    pub async fn install(&self, response: TokenResponse) {
        let mut state = self.state.write().await;
        self.store(&mut state, response, false);
    }

    /// Drop the cached access token so the next call fetches a new one
    ///
    /// The refresh token is kept.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.access = None;
        state.refresh_at = None;
        debug!("access token invalidated");
    }

    /// Drop the cached access token only if it is still `rejected`
    ///
    /// A request that got a 401 may race with another worker that has
    /// already installed a fresh token; that token is kept. Returns whether
    /// the cache was cleared.
    pub async fn invalidate_if_current(&self, rejected: &str) -> bool {
        let mut state = self.state.write().await;
        if state.access.as_ref().map_or(true, |access| access.access_token != rejected) {
            debug!("rejected token already replaced");
            return false;
        }
        state.access = None;
        state.refresh_at = None;
        debug!("access token invalidated");
        true
    }

    /// Revoke an arbitrary token
    ///
    /// # Errors
    /// OAuth, transport and cancellation errors from the revocation endpoint.
    pub async fn revoke(
        &self,
        scope: &CancelScope,
        token: impl Into<String>,
        hint: Option<TokenTypeHint>,
    ) -> Result<()> {
        self.oauth.revoke(scope, &RevokeRequest::new(token, hint)).await
    }

    /// Revoke whatever the manager holds, then forget it
    ///
    /// The refresh token goes first since revoking it usually invalidates
    /// the access tokens derived from it.
    ///
    /// # Errors
    /// The first revocation failure; the cache is left untouched then.
    #[instrument(skip_all)]
    pub async fn revoke_current(&self, scope: &CancelScope) -> Result<()> {
        let mut state = scope.run(self.state.write()).await?;
        if let Some(refresh_token) = state.refresh_token.clone() {
            self.revoke(scope, refresh_token, Some(TokenTypeHint::RefreshToken)).await?;
        }
        if let Some(access) = state.access.as_ref() {
            let token = access.access_token.clone();
            self.revoke(scope, token, Some(TokenTypeHint::AccessToken)).await?;
        }
        *state = TokenState::default();
        info!("cached tokens revoked");
        Ok(())
    }

    pub async fn snapshot(&self) -> TokenSnapshot {
        let state = self.state.read().await;
        let now = self.clock.now();
        TokenSnapshot {
            has_access_token: state.access.is_some(),
            issued_at: state.access.as_ref().map(|a| a.issued_at),
            expires_in: state.access.as_ref().map(|a| a.expires_in),
            has_refresh_token: state.refresh_token.is_some(),
            refresh_in: state.refresh_at.map(|at| at.saturating_duration_since(now)),
        }
    }

    /// Store `response` and return its access token
    ///
    /// A refresh response without a new refresh token keeps the old one.
    fn store(&self, state: &mut TokenState, response: TokenResponse, from_refresh: bool) -> String {
        let (access, refresh_token) = response.into_parts();
        let token = access.access_token.clone();
        state.refresh_at = Some(refresh_deadline(self.clock.now(), access.expires_in, self.buffer));
        state.access = Some(access);

        if !self.use_refresh_tokens {
            state.refresh_token = None;
        } else if refresh_token.is_some() || !from_refresh {
            state.refresh_token = refresh_token;
        }
        token
    }
}

impl<C: Clock> fmt::Debug for TokenManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("oauth", &self.oauth)
            .field("scopes", &self.scopes)
            .field("buffer", &self.buffer)
            .field("use_refresh_tokens", &self.use_refresh_tokens)
            .finish_non_exhaustive()
    }
}
