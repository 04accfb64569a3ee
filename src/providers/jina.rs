//! Jina AI embeddings.

use super::{bearer_profile, non_blank, parse_url, ACCEPT_JSON, CONTENT_TYPE_JSON, TOLERANT_RULES};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_ENDPOINT: &str = "https://api.jina.ai/v1/embeddings";
pub const DEFAULT_MODEL: &str = "jina-embeddings-v3";

/// `endpoint` (or `base_url`) is the full embeddings URL.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = non_blank(settings.endpoint.as_deref())
        .or(non_blank(settings.base_url.as_deref()))
        .unwrap_or(DEFAULT_ENDPOINT);
    let endpoint = parse_url("Jina", endpoint)?;
    Ok(bearer_profile(
        "Jina",
        settings,
        endpoint,
        DEFAULT_MODEL,
        &[CONTENT_TYPE_JSON, ACCEPT_JSON],
    )?
    .rules(TOLERANT_RULES))
}
