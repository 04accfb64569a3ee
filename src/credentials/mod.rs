//! Credential strategies.
//!
//! A [`CredentialManager`] attaches an authorization artifact to each
//! outgoing request and tells the adapter whether a response means the
//! artifact was rejected. Each manager owns its own cached state; nothing is
//! process-global.

#[cfg(feature = "jwt")]
mod jwt;
mod oauth;
#[cfg(feature = "tc3")]
mod tc3;

#[cfg(feature = "jwt")]
pub use jwt::SelfSignedJwt;
pub use oauth::{CachedToken, ClientCredentials, TokenEndpoint};
#[cfg(feature = "tc3")]
pub use tc3::Tc3Signer;

use crate::error::{ErrorKind, ProviderError, Result};
use crate::transport::{HttpRequest, Transport};
use secrecy::{ExposeSecret, Secret, SecretString};
use serde_json::Value;

/// Produces and maintains the authorization for one adapter.
pub trait CredentialManager: Send + Sync {
    /// Attach the current credential to `request`, acquiring one through
    /// `transport` first if needed.
    fn authorize(&self, request: &mut HttpRequest, transport: &dyn Transport) -> Result<()>;

    /// Whether a response signals an invalid or expired credential.
    fn is_rejection(&self, _status: u16, _payload: Option<&Value>) -> bool {
        false
    }

    /// Drop the cached credential if it is the one `rejected` carried.
    /// Returns `true` if a retry could succeed.
    fn invalidate(&self, _rejected: &HttpRequest) -> bool {
        false
    }
}

/// Where a static key goes on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPlacement {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// A named header carrying the raw key, e.g. `api-key`.
    Header(String),
    /// A named query parameter, e.g. `key`.
    Query(String),
}

impl AuthPlacement {
    /// Put `secret` on the request, replacing any caller-supplied value.
    pub(crate) fn apply(&self, request: &mut HttpRequest, secret: &str) -> Result<()> {
        match self {
            AuthPlacement::Bearer => set_bearer(request, secret),
            AuthPlacement::Header(name) => request.set_header(name, secret).map_err(|e| {
                ProviderError::with_source(ErrorKind::Credential, "credential is not a valid header", e)
            }),
            AuthPlacement::Query(name) => {
                request.add_query(name, secret);
                Ok(())
            }
        }
    }

    /// The secret this placement put on `request`, if any.
    pub(crate) fn read(&self, request: &HttpRequest) -> Option<String> {
        match self {
            AuthPlacement::Bearer => request
                .header("authorization")?
                .strip_prefix("Bearer ")
                .map(str::to_string),
            AuthPlacement::Header(name) => request.header(name).map(str::to_string),
            AuthPlacement::Query(name) => request.query_value(name),
        }
    }
}

/// A secret supplied once and reused for every call.
pub struct StaticKey {
    key: SecretString,
    placement: AuthPlacement,
}

impl StaticKey {
    pub fn new(key: SecretString, placement: AuthPlacement) -> Self {
        Self { key, placement }
    }

    pub fn bearer(key: SecretString) -> Self {
        Self::new(key, AuthPlacement::Bearer)
    }

    pub fn header(name: &str, key: SecretString) -> Self {
        Self::new(key, AuthPlacement::Header(name.to_string()))
    }

    pub fn query(name: &str, key: SecretString) -> Self {
        Self::new(key, AuthPlacement::Query(name.to_string()))
    }
}

impl CredentialManager for StaticKey {
    fn authorize(&self, request: &mut HttpRequest, _transport: &dyn Transport) -> Result<()> {
        self.placement.apply(request, self.key.expose_secret())
    }
}

/// No authorization, for local servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialManager for Anonymous {
    fn authorize(&self, _request: &mut HttpRequest, _transport: &dyn Transport) -> Result<()> {
        Ok(())
    }
}

/// Set `Authorization: Bearer <token>`, replacing any caller-supplied value.
pub(crate) fn set_bearer(request: &mut HttpRequest, token: &str) -> Result<()> {
    request
        .set_header("Authorization", &format!("Bearer {}", token))
        .map_err(|e| {
            ProviderError::with_source(ErrorKind::Credential, "token is not a valid header", e)
        })
}

/// Require a non-blank secret at construction time.
pub fn require_secret(provider: &str, field: &str, value: Option<&SecretString>) -> Result<SecretString> {
    match value {
        Some(secret) if !secret.expose_secret().trim().is_empty() => {
            Ok(Secret::new(secret.expose_secret().clone()))
        }
        _ => Err(ProviderError::config(format!("{} {} is required", provider, field))),
    }
}

/// Require a non-blank plain setting (endpoint, deployment, ...).
pub fn require_value(provider: &str, field: &str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ProviderError::config(format!("{} {} is required", provider, field))),
    }
}

/// A secret that is present and non-blank, or `None`.
pub(crate) fn present(value: Option<&SecretString>) -> Option<SecretString> {
    value
        .filter(|s| !s.expose_secret().trim().is_empty())
        .map(|s| Secret::new(s.expose_secret().clone()))
}
