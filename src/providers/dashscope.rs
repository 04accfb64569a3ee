//! Alibaba DashScope (Qwen) text embeddings.

use super::{finish, resolve_endpoint, vendor_options, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::{AdapterProfile, ExtractionRule, RequestShape};
use crate::error::Result;
use serde_json::json;

const NAME: &str = "DashScope";

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-v3";

const RULES: &[ExtractionRule] = &[ExtractionRule::Nested {
    path: &["output", "embeddings"],
    keys: &["embedding"],
}];

/// `{model, input: {texts}, parameters}` in, `output.embeddings[]` out,
/// ordered by `text_index`.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let endpoint = resolve_endpoint(
        NAME,
        settings,
        DEFAULT_BASE_URL,
        "/services/embeddings/text-embedding/text-embedding",
    )?;

    let mut parameters = json!({"text_type": "document"});
    if let Some(dimensions) = settings.dimensions {
        parameters["dimension"] = json!(dimensions);
    }
    let options = vendor_options(settings, vec![("parameters", parameters)]);

    let profile = AdapterProfile::new(
        NAME,
        settings.model_or(DEFAULT_MODEL),
        endpoint,
        Box::new(StaticKey::bearer(key)),
    )
    .shape(RequestShape::Wrapped {
        outer: "input",
        inner: "texts",
    })
    .rules(RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &options)
}
