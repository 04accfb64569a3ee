//! Google Gemini embeddings via `batchEmbedContents`.

use super::{finish, join_url, non_blank, parse_url, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::{AdapterProfile, ExtractionRule, RequestShape};
use crate::error::Result;
use serde_json::{json, Value};

const NAME: &str = "Gemini";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "text-embedding-004";

const RULES: &[ExtractionRule] = &[ExtractionRule::EmbeddingsArray];

fn batch_body(model: &str, texts: &[String]) -> Value {
    let requests: Vec<Value> = texts
        .iter()
        .map(|text| {
            json!({
                "model": format!("models/{}", model),
                "content": {"parts": [{"text": text}]}
            })
        })
        .collect();
    json!({ "requests": requests })
}

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let key = require_secret(NAME, "api key", settings.api_key.as_ref())?;
    let model = settings.model_or(DEFAULT_MODEL);
    let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

    let endpoint = match non_blank(settings.endpoint.as_deref()) {
        Some(endpoint) => parse_url(NAME, endpoint)?,
        None => join_url(
            NAME,
            non_blank(settings.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL),
            &format!("/models/{}:batchEmbedContents", model),
        )?,
    };

    let profile = AdapterProfile::new(
        NAME,
        model,
        endpoint,
        Box::new(StaticKey::header("x-goog-api-key", key)),
    )
    .shape(RequestShape::Custom(batch_body))
    .rules(RULES);
    finish(profile, settings, &[CONTENT_TYPE_JSON], &settings.request_options)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{adapter, keyed};
    use crate::config::ProviderKind;
    use crate::embedding::{EmbeddingProvider, TextInputs};
    use crate::transport::scripted::ScriptedTransport;
    use serde_json::json;

    #[test]
    fn test_batch_embed_contents() {
        let transport = ScriptedTransport::new().ok(json!({
            "embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]
        }));
        let mut settings = keyed(ProviderKind::Gemini);
        settings.model = Some("models/gemini-embedding-001".to_string());

        let provider = adapter(&settings, &transport);
        assert_eq!(provider.model(), "gemini-embedding-001");
        let vectors = provider.embed_documents(TextInputs::from(["a", "b"])).unwrap();

        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        assert_eq!(
            transport.url(0),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-embedding-001:batchEmbedContents"
        );
        assert_eq!(
            transport.body(0),
            json!({"requests": [
                {"model": "models/gemini-embedding-001", "content": {"parts": [{"text": "a"}]}},
                {"model": "models/gemini-embedding-001", "content": {"parts": [{"text": "b"}]}}
            ]})
        );
        let requests = transport.requests();
        assert_eq!(requests[0].header("x-goog-api-key"), Some("test-key"));
        assert!(requests[0].header("authorization").is_none());
    }
}
