//! MiniMax embeddings.
//!
//! Requests carry the account's `GroupId` as a query parameter and a `type`
//! of `db` (documents) or `query`. Vectors come back as `vectors: [[...]]`,
//! with failures reported through `base_resp.status_code`.

use super::{finish, resolve_endpoint, vendor_options, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, require_value, StaticKey};
use crate::embedding::{AdapterProfile, ExtractionRule, RequestShape};
use crate::error::Result;
use serde_json::json;

const NAME: &str = "MiniMax";

pub const DEFAULT_BASE_URL: &str = "https://api.minimax.chat/v1";
pub const DEFAULT_MODEL: &str = "embo-01";

const RULES: &[ExtractionRule] = &[ExtractionRule::Nested {
    path: &["vectors"],
    keys: &[],
}];

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let group_id = require_value(NAME, "group id", settings.group_id.as_deref())?;
    let mut endpoint = resolve_endpoint(NAME, settings, DEFAULT_BASE_URL, "/embeddings")?;
    endpoint.query_pairs_mut().append_pair("GroupId", &group_id);

    let options = vendor_options(settings, vec![("type", json!("db"))]);
    let profile = AdapterProfile::new(
        NAME,
        settings.model_or(DEFAULT_MODEL),
        endpoint,
        Box::new(StaticKey::bearer(key)),
    )
    .shape(RequestShape::Flat {
        model_key: Some("model"),
        input_key: "texts",
    })
    .rules(RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &options)
}
