//! Voyage AI embeddings.

use super::{finish, resolve_endpoint, vendor_options, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::AdapterProfile;
use crate::error::Result;
use serde_json::json;

const NAME: &str = "Voyage";

pub const DEFAULT_BASE_URL: &str = "https://api.voyageai.com/v1";
pub const DEFAULT_MODEL: &str = "voyage-3";

/// `dimensions` maps to Voyage's `output_dimension`.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let endpoint = resolve_endpoint(NAME, settings, DEFAULT_BASE_URL, "/embeddings")?;
    let defaults = match settings.dimensions {
        Some(dimensions) => vec![("output_dimension", json!(dimensions))],
        None => Vec::new(),
    };
    let profile = AdapterProfile::new(
        NAME,
        settings.model_or(DEFAULT_MODEL),
        endpoint,
        Box::new(StaticKey::bearer(key)),
    );
    finish(profile, settings, &[CONTENT_TYPE_JSON], &vendor_options(settings, defaults))
}
