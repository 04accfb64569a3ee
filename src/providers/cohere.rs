//! Cohere embeddings (`/v2/embed`).
//!
//! v2 returns vectors keyed by encoding type (`{"embeddings": {"float": ...}}`);
//! v1-style bodies with a plain `embeddings` array are read as well.

use super::{finish, resolve_endpoint, vendor_options, ACCEPT_JSON, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::{AdapterProfile, ExtractionRule, RequestShape};
use crate::error::Result;
use serde_json::json;

const NAME: &str = "Cohere";

pub const DEFAULT_BASE_URL: &str = "https://api.cohere.com/v2";
pub const DEFAULT_MODEL: &str = "embed-english-v3.0";

const RULES: &[ExtractionRule] = &[
    ExtractionRule::TypedMap {
        field: "embeddings",
        preferred: "float",
    },
    ExtractionRule::EmbeddingsArray,
];

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let endpoint = resolve_endpoint(NAME, settings, DEFAULT_BASE_URL, "/embed")?;
    let options = vendor_options(
        settings,
        vec![
            ("input_type", json!("search_document")),
            ("embedding_types", json!(["float"])),
        ],
    );

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
    finish(profile, settings, &[CONTENT_TYPE_JSON, ACCEPT_JSON], &options)
}
