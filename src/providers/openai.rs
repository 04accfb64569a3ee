//! OpenAI embeddings (`/v1/embeddings`).

use super::{bearer_profile, organization_header, resolve_endpoint, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::embedding::AdapterProfile;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let endpoint = resolve_endpoint("OpenAI", settings, DEFAULT_BASE_URL, "/embeddings")?;
    let mut headers = vec![CONTENT_TYPE_JSON];
    headers.extend(organization_header(settings));
    bearer_profile("OpenAI", settings, endpoint, DEFAULT_MODEL, &headers)
}
