//! Local Ollama server.
//!
//! Newer servers expose a batch `/api/embed`; older ones only the per-prompt
//! `/api/embeddings`. A 404 from the batch endpoint switches the call over.

use super::{finish, join_url, non_blank, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::Anonymous;
use crate::embedding::{AdapterProfile, EndpointPlan, ExtractionRule, LegacyEndpoint, RequestShape};
use crate::error::Result;

const NAME: &str = "Ollama";

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "nomic-embed-text";

const BATCH_RULES: &[ExtractionRule] = &[ExtractionRule::EmbeddingsArray];
const LEGACY_RULES: &[ExtractionRule] = &[ExtractionRule::Single { key: "embedding" }];

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let base = non_blank(settings.base_url.as_deref())
        .or(non_blank(settings.endpoint.as_deref()))
        .unwrap_or(DEFAULT_BASE_URL);
    let legacy = LegacyEndpoint {
        url: join_url(NAME, base, "/api/embeddings")?,
        shape: RequestShape::Scalar {
            model_key: Some("model"),
            input_key: "prompt",
        },
        rules: LEGACY_RULES,
    };

    let profile = AdapterProfile::new(
        NAME,
        settings.model_or(DEFAULT_MODEL),
        join_url(NAME, base, "/api/embed")?,
        Box::new(Anonymous),
    )
    .plan(EndpointPlan::Fallback {
        legacy,
        prefer_legacy: settings.prefer_legacy_endpoint,
    })
    .rules(BATCH_RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &settings.request_options)
}
