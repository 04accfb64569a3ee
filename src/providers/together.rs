//! Together AI embeddings.

use super::{bearer_profile, resolve_endpoint, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_MODEL: &str = "togethercomputer/m2-bert-80M-8k-retrieval";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = resolve_endpoint("Together", settings, DEFAULT_BASE_URL, "/embeddings")?;
    bearer_profile("Together", settings, endpoint, DEFAULT_MODEL, &[CONTENT_TYPE_JSON])
}
