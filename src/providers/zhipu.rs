//! Zhipu AI (BigModel) embeddings.

use super::{bearer_profile, resolve_endpoint, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const DEFAULT_MODEL: &str = "embedding-3";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = resolve_endpoint("Zhipu", settings, DEFAULT_BASE_URL, "/embeddings")?;
    bearer_profile("Zhipu", settings, endpoint, DEFAULT_MODEL, &[CONTENT_TYPE_JSON])
}
