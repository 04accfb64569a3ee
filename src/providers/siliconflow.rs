//! SiliconFlow embeddings.

use super::{bearer_profile, resolve_endpoint, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.siliconflow.cn/v1";
pub const DEFAULT_MODEL: &str = "internlm2.5-embedding";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = resolve_endpoint("SiliconFlow", settings, DEFAULT_BASE_URL, "/embeddings")?;
    bearer_profile("SiliconFlow", settings, endpoint, DEFAULT_MODEL, &[CONTENT_TYPE_JSON])
}
