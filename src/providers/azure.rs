//! Azure OpenAI deployments.

use super::{finish, join_url, non_blank, openai_options, organization_header, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, require_value, StaticKey};
use crate::embedding::AdapterProfile;
use crate::error::{ProviderError, Result};
use secrecy::{ExposeSecret, SecretString};

const NAME: &str = "Azure OpenAI";

pub const DEFAULT_DEPLOYMENT: &str = "text-embedding-3-large";
pub const DEFAULT_API_VERSION: &str = "2024-02-01";

/// `{endpoint}/openai/deployments/{deployment}/embeddings?api-version=...`,
/// authenticated with an Entra ID bearer token or an `api-key` header. The
/// deployment doubles as the model name in the body.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let credentials = credentials(settings)?;
    let endpoint = require_value(NAME, "endpoint", settings.endpoint.as_deref())?;
    let deployment = match settings.deployment.as_deref().or(settings.model.as_deref()) {
        Some(name) => require_value(NAME, "deployment", Some(name))?,
        None => DEFAULT_DEPLOYMENT.to_string(),
    };
    let api_version = non_blank(settings.api_version.as_deref()).unwrap_or(DEFAULT_API_VERSION);

    let mut url = join_url(
        NAME,
        &endpoint,
        &format!("/openai/deployments/{}/embeddings", deployment),
    )?;
    url.query_pairs_mut().append_pair("api-version", api_version);

    let mut headers = vec![CONTENT_TYPE_JSON];
    headers.extend(organization_header(settings));
    let profile = AdapterProfile::new(NAME, deployment, url, Box::new(credentials));
    finish(profile, settings, &headers, &openai_options(settings))
}

/// An Entra ID token wins over the api key when both are set.
fn credentials(settings: &EmbeddingSettings) -> Result<StaticKey> {
    if let Some(token) = settings.access_token.as_ref().filter(|t| !blank(t)) {
        return Ok(StaticKey::bearer(require_secret(NAME, "azure_ad_token", Some(token))?));
    }
    match settings.api_key.as_ref().filter(|k| !blank(k)) {
        Some(key) => Ok(StaticKey::header("api-key", require_secret(NAME, "api key", Some(key))?)),
        None => Err(ProviderError::config(format!(
            "{} requires an api key or azure_ad_token",
            NAME
        ))),
    }
}

fn blank(secret: &SecretString) -> bool {
    secret.expose_secret().trim().is_empty()
}
