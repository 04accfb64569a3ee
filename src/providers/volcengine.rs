//! Volcengine Ark (Doubao) embeddings. `model` may be a model name or an
//! inference endpoint id (`ep-...`).

use super::{bearer_profile, resolve_endpoint, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
pub const DEFAULT_MODEL: &str = "doubao-embedding-text-240715";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = resolve_endpoint("Volcengine Ark", settings, DEFAULT_BASE_URL, "/embeddings")?;
    bearer_profile("Volcengine Ark", settings, endpoint, DEFAULT_MODEL, &[CONTENT_TYPE_JSON])
}
