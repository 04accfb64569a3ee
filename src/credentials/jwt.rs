//! Self-signed HS256 tokens (SenseNova style).

use super::{set_bearer, CredentialManager};
use crate::error::{ErrorKind, ProviderError, Result};
use crate::transport::{HttpRequest, Transport};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Token lifetime.
const TOKEN_TTL_SECS: i64 = 1800;
/// Backdating of `nbf` to tolerate clock skew.
const NOT_BEFORE_SKEW_SECS: i64 = 5;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub iss: String,
    pub exp: i64,
    pub nbf: i64,
}

/// Signs a fresh short-lived JWT for every request. Nothing is cached.
pub struct SelfSignedJwt {
    access_key_id: String,
    secret_access_key: SecretString,
}

impl SelfSignedJwt {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: SecretString) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key,
        }
    }

    /// Build and sign a token valid from a few seconds ago until 30 minutes out.
    pub fn sign(&self) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.access_key_id.clone(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
            nbf: (now - Duration::seconds(NOT_BEFORE_SKEW_SECS)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret_access_key.expose_secret().as_bytes()),
        )
        .map_err(|e| ProviderError::with_source(ErrorKind::Credential, "failed to sign JWT", e))
    }
}

impl CredentialManager for SelfSignedJwt {
    fn authorize(&self, request: &mut HttpRequest, _transport: &dyn Transport) -> Result<()> {
        let token = self.sign()?;
        set_bearer(request, &token)
    }
}
