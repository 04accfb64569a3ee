//! Hugging Face Inference API feature extraction.

use super::{finish, non_blank, parse_url, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::{AdapterProfile, ExtractionRule, RequestShape};
use crate::error::Result;

const NAME: &str = "Hugging Face";

pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction/{model}";
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

const RULES: &[ExtractionRule] = &[ExtractionRule::BareArray];

/// The model is part of the URL; `endpoint` may carry a `{model}` placeholder
/// or point at a dedicated inference endpoint.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let model = settings.model_or(DEFAULT_MODEL);
    let template = non_blank(settings.endpoint.as_deref()).unwrap_or(DEFAULT_ENDPOINT);
    let endpoint = parse_url(NAME, &template.replace("{model}", &model))?;

    let profile = AdapterProfile::new(NAME, model, endpoint, Box::new(StaticKey::bearer(key)))
        .shape(RequestShape::Flat {
            model_key: None,
            input_key: "inputs",
        })
        .rules(RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &settings.request_options)
}
