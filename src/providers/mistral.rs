//! Mistral AI embeddings.

use super::{bearer_profile, resolve_endpoint, ACCEPT_JSON, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-embed";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = resolve_endpoint("Mistral", settings, DEFAULT_BASE_URL, "/embeddings")?;
    bearer_profile(
        "Mistral",
        settings,
        endpoint,
        DEFAULT_MODEL,
        &[CONTENT_TYPE_JSON, ACCEPT_JSON],
    )
}
