//! Any server exposing an OpenAI-style embeddings route (vLLM, LM Studio,
//! llama.cpp, LocalAI, ...).

use super::{finish, join_url, non_blank, openai_options, parse_url, CONTENT_TYPE_JSON, TOLERANT_RULES};
use crate::config::EmbeddingSettings;
use crate::credentials::{present, require_value, Anonymous, CredentialManager, StaticKey};
use crate::embedding::AdapterProfile;
use crate::error::Result;

const NAME: &str = "OpenAI-compatible";

/// Requires a base URL (or full endpoint) and a model; the key is optional.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = match non_blank(settings.endpoint.as_deref()) {
        Some(endpoint) => parse_url(NAME, endpoint)?,
        None => {
            let base = require_value(NAME, "base url", settings.base_url.as_deref())?;
            join_url(NAME, &base, "/embeddings")?
        }
    };
    let model = require_value(NAME, "model", settings.model.as_deref())?;

    let credentials: Box<dyn CredentialManager> = match present(settings.api_key.as_ref()) {
        Some(key) => Box::new(StaticKey::bearer(key)),
        None => Box::new(Anonymous),
    };
    let profile = AdapterProfile::new(NAME, model, endpoint, credentials).rules(TOLERANT_RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &openai_options(settings))
}
