//! Tencent Hunyuan embeddings over the TC3-signed cloud API.
//!
//! `GetEmbedding` accepts one input per call, so batches are sent one item
//! at a time. Vectors come back under `Response.Data[].Embedding`.

use super::{finish, non_blank, parse_url};
use crate::config::EmbeddingSettings;
use crate::credentials::{present, require_secret, require_value, Tc3Signer};
use crate::embedding::{AdapterProfile, EndpointPlan, ExtractionRule, RequestShape};
use crate::error::Result;

const NAME: &str = "Tencent Hunyuan";

pub const DEFAULT_HOST: &str = "hunyuan.tencentcloudapi.com";
pub const DEFAULT_REGION: &str = "ap-guangzhou";
pub const DEFAULT_MODEL: &str = "hunyuan-embedding";
pub const ACTION: &str = "GetEmbedding";
pub const API_VERSION: &str = "2023-09-01";

const RULES: &[ExtractionRule] = &[ExtractionRule::Nested {
    path: &["Response", "Data"],
    keys: &["Embedding", "embedding"],
}];

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let secret_id = require_value(NAME, "secret id", settings.access_key_id.as_deref())?;
    let secret_key = require_secret(NAME, "secret key", settings.secret_key.as_ref())?;
    let region = non_blank(settings.region.as_deref()).unwrap_or(DEFAULT_REGION);
    let endpoint = match non_blank(settings.endpoint.as_deref()) {
        Some(endpoint) if endpoint.contains("://") => parse_url(NAME, endpoint)?,
        Some(host) => parse_url(NAME, &format!("https://{}/", host.trim()))?,
        None => parse_url(NAME, &format!("https://{}/", DEFAULT_HOST))?,
    };

    let signer = Tc3Signer::new(
        secret_id,
        secret_key,
        ACTION,
        API_VERSION,
        region,
    )
    .with_session_token(present(settings.session_token.as_ref()));

    let profile = AdapterProfile::new(NAME, settings.model_or(DEFAULT_MODEL), endpoint, Box::new(signer))
        .plan(EndpointPlan::PerItem)
        .shape(RequestShape::Scalar {
            model_key: None,
            input_key: "Input",
        })
        .rules(RULES);
    finish(profile, settings, &[], &settings.request_options)
}
