//! Baichuan embeddings.

use super::{finish, resolve_endpoint, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::AdapterProfile;
use crate::error::Result;

const NAME: &str = "Baichuan";

pub const DEFAULT_BASE_URL: &str = "https://api.baichuan-ai.com/v1";
pub const DEFAULT_MODEL: &str = "Baichuan-Text-Embedding";

/// Fixed-size vectors; only the caller's request options are forwarded.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let endpoint = resolve_endpoint(NAME, settings, DEFAULT_BASE_URL, "/embeddings")?;
    let profile = AdapterProfile::new(
        NAME,
        settings.model_or(DEFAULT_MODEL),
        endpoint,
        Box::new(StaticKey::bearer(key)),
    );
    finish(profile, settings, &[CONTENT_TYPE_JSON], &settings.request_options)
}
