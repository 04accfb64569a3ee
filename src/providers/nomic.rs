//! Nomic Atlas text embeddings.

use super::{finish, resolve_endpoint, vendor_options, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::{AdapterProfile, ExtractionRule, RequestShape};
use crate::error::Result;
use serde_json::json;

const NAME: &str = "Nomic";

pub const DEFAULT_BASE_URL: &str = "https://api-atlas.nomic.ai/v1";
pub const DEFAULT_MODEL: &str = "nomic-embed-text-v1.5";

const RULES: &[ExtractionRule] = &[ExtractionRule::EmbeddingsArray];

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let endpoint = resolve_endpoint(NAME, settings, DEFAULT_BASE_URL, "/embedding/text")?;
    let mut defaults = vec![("task_type", json!("search_document"))];
    if let Some(dimensions) = settings.dimensions {
        defaults.push(("dimensionality", json!(dimensions)));
    }

    let profile = AdapterProfile::new(
        NAME,
        settings.model_or(DEFAULT_MODEL),
        endpoint,
        Box::new(StaticKey::bearer(key)),
    )
    .shape(RequestShape::Flat {
        model_key: Some("model"),
        input_key: "texts",
    })
    .rules(RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &vendor_options(settings, defaults))
}
