//! OAuth2-style client-credential tokens with cached expiry.

use super::{AuthPlacement, CredentialManager};
use crate::error::{ErrorKind, ProviderError, Result};
use crate::transport::{HttpRequest, StatusError, Transport};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, Secret, SecretString};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// Subtracted from the server's `expires_in` before caching.
const EXPIRY_MARGIN_SECS: f64 = 60.0;

/// Where tokens are exchanged.
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    pub url: Url,
    /// Timeout for the exchange, separate from the embedding call.
    pub timeout: Option<std::time::Duration>,
}

/// A bearer token and the instant it stops being usable.
#[derive(Debug)]
pub struct CachedToken {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl Clone for CachedToken {
    fn clone(&self) -> Self {
        Self::new(Secret::new(self.secret()), self.expires_at)
    }
}

impl CachedToken {
    pub fn new(token: SecretString, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// `None` means the token never expires locally.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }

    fn secret(&self) -> String {
        self.token.expose_secret().clone()
    }
}

/// Caches an access token and refreshes it through a client-credentials
/// exchange when it expires or the backend rejects it.
///
/// The cache lock is held across the exchange, so concurrent callers on one
/// instance wait for a single refresh instead of racing.
pub struct ClientCredentials {
    provider: &'static str,
    client: Option<(String, SecretString)>,
    endpoint: TokenEndpoint,
    placement: AuthPlacement,
    rejection_codes: Vec<i64>,
    state: Mutex<Option<CachedToken>>,
}

impl ClientCredentials {
    pub fn new(provider: &'static str, endpoint: TokenEndpoint) -> Self {
        Self {
            provider,
            client: None,
            endpoint,
            placement: AuthPlacement::Bearer,
            rejection_codes: Vec::new(),
            state: Mutex::new(None),
        }
    }

    /// Client id and secret used for refreshing.
    pub fn with_client(mut self, client_id: impl Into<String>, client_secret: SecretString) -> Self {
        self.client = Some((client_id.into(), client_secret));
        self
    }

    /// Seed the cache with a pre-issued token.
    pub fn with_token(self, token: CachedToken) -> Self {
        *self.state.lock() = Some(token);
        self
    }

    pub fn with_placement(mut self, placement: AuthPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// JSON `error_code` values that mean the token is invalid or expired.
    pub fn with_rejection_codes(mut self, codes: &[i64]) -> Self {
        self.rejection_codes = codes.to_vec();
        self
    }

    /// Whether new tokens can be fetched.
    pub fn can_refresh(&self) -> bool {
        self.client.is_some()
    }

    /// Snapshot of the cached token, if any.
    pub fn cached(&self) -> Option<CachedToken> {
        self.state.lock().clone()
    }

    fn current_token(&self, transport: &dyn Transport) -> Result<String> {
        let mut state = self.state.lock();
        if let Some(cached) = state.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.secret());
            }
        }

        let Some((client_id, client_secret)) = &self.client else {
            // Without client credentials a stale token is still the best we have.
            return match state.as_ref() {
                Some(cached) => Ok(cached.secret()),
                None => Err(ProviderError::credential(format!(
                    "{} access token is missing and cannot be refreshed automatically",
                    self.provider
                ))),
            };
        };

        let fresh = self.exchange(transport, client_id, client_secret)?;
        let token = fresh.secret();
        *state = Some(fresh);
        Ok(token)
    }

    fn exchange(
        &self,
        transport: &dyn Transport,
        client_id: &str,
        client_secret: &SecretString,
    ) -> Result<CachedToken> {
        info!(provider = self.provider, "Refreshing access token");

        let mut request = HttpRequest::post(self.endpoint.url.clone());
        request.add_query("grant_type", "client_credentials");
        request.add_query("client_id", client_id);
        request.add_query("client_secret", client_secret.expose_secret());
        request.timeout = self.endpoint.timeout;

        let failed = || format!("Failed to refresh {} access token", self.provider);
        let response = transport
            .send(&request)
            .map_err(|e| ProviderError::with_source(ErrorKind::Credential, failed(), e))?;
        if !response.is_success() {
            return Err(ProviderError::with_source(
                ErrorKind::Credential,
                failed(),
                StatusError {
                    status: response.status,
                    body: response.body,
                },
            ));
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|e| {
            ProviderError::with_source(
                ErrorKind::Credential,
                format!("Failed to parse {} access token response", self.provider),
                e,
            )
        })?;

        let token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ProviderError::credential(format!(
                    "{} token response did not contain access_token",
                    self.provider
                ))
            })?;

        let now = Utc::now();
        let expires_at = payload
            .get("expires_in")
            .and_then(Value::as_f64)
            .map(|secs| now + Duration::milliseconds(((secs - EXPIRY_MARGIN_SECS) * 1000.0) as i64));
        debug!(provider = self.provider, ?expires_at, "Access token cached");

        Ok(CachedToken::new(Secret::new(token.to_string()), expires_at))
    }
}

impl CredentialManager for ClientCredentials {
    fn authorize(&self, request: &mut HttpRequest, transport: &dyn Transport) -> Result<()> {
        let token = self.current_token(transport)?;
        self.placement.apply(request, &token)
    }

    fn is_rejection(&self, status: u16, payload: Option<&Value>) -> bool {
        if status == 401 {
            return true;
        }
        payload
            .and_then(|p| p.get("error_code"))
            .and_then(Value::as_i64)
            .is_some_and(|code| self.rejection_codes.contains(&code))
    }

    fn invalidate(&self, rejected: &HttpRequest) -> bool {
        let mut state = self.state.lock();
        // Another caller may already have replaced the token that was rejected.
        let still_cached = match (state.as_ref(), self.placement.read(rejected)) {
            (Some(cached), Some(used)) => cached.secret() == used,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if still_cached {
            *state = None;
        }
        true
    }
}
