//! SenseNova embeddings, authorized with a self-signed JWT per request.

use super::{finish, non_blank, parse_url, ACCEPT_JSON, CONTENT_TYPE_JSON, TOLERANT_RULES};
use crate::config::EmbeddingSettings;
use crate::credentials::{require_secret, require_value, SelfSignedJwt};
use crate::embedding::AdapterProfile;
use crate::error::Result;

const NAME: &str = "SenseNova";

pub const DEFAULT_ENDPOINT: &str = "https://api.sensenova.cn/v1/llm/embeddings";
pub const DEFAULT_MODEL: &str = "nova-embedding-v1";

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let access_key_id = require_value(NAME, "access key id", settings.access_key_id.as_deref())?;
    let secret_key = require_secret(NAME, "secret access key", settings.secret_key.as_ref())?;
    let endpoint = parse_url(
        NAME,
        non_blank(settings.endpoint.as_deref()).unwrap_or(DEFAULT_ENDPOINT),
    )?;

    let signer = SelfSignedJwt::new(access_key_id, secret_key);
    let profile = AdapterProfile::new(NAME, settings.model_or(DEFAULT_MODEL), endpoint, Box::new(signer))
        .rules(TOLERANT_RULES);
    finish(
        profile,
        settings,
        &[CONTENT_TYPE_JSON, ACCEPT_JSON],
        &settings.request_options,
    )
}

#[cfg(test)]
mod tests {
    use super::super::testing::{adapter, secret};
    use super::*;
    use crate::config::ProviderKind;
    use crate::embedding::{EmbeddingProvider, TextInputs};
    use crate::error::ErrorKind;
    use crate::transport::scripted::ScriptedTransport;
    use jsonwebtoken::{decode, DecodingKey, Validation};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Claims {
        iss: String,
        exp: i64,
        nbf: i64,
    }

    fn settings() -> EmbeddingSettings {
        EmbeddingSettings {
            access_key_id: Some("ak-123".to_string()),
            secret_key: secret("sk-456"),
            ..EmbeddingSettings::new(ProviderKind::SenseNova)
        }
    }

    #[test]
    fn test_requires_both_keys() {
        let mut s = settings();
        s.secret_key = None;
        let err = profile(&s).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains("secret access key"));

        let mut s = settings();
        s.access_key_id = Some("  ".to_string());
        assert!(profile(&s).err().unwrap().message().contains("access key id"));
    }

    #[test]
    fn test_data_layout_and_options() {
        let transport = ScriptedTransport::new().ok(json!({
            "data": [{"embedding": [0.1, 0.2]}, {"embedding": [0.3, 0.4]}]
        }));
        let mut s = settings();
        s.model = Some("nova-embedding-lite".to_string());
        s.request_options.insert("truncate".to_string(), json!("start"));
        let vectors = adapter(&s, &transport)
            .embed_documents(TextInputs::from(["a", "b"]))
            .unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        assert_eq!(
            transport.body(0),
            json!({"model": "nova-embedding-lite", "input": ["a", "b"], "truncate": "start"})
        );
    }

    #[test]
    fn test_request_carries_fresh_jwt() {
        let transport = ScriptedTransport::new().ok(json!({
            "embeddings": [{"index": 0, "embedding": [0.1, 0.2], "status": "success"}],
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        }));
        let vectors = adapter(&settings(), &transport)
            .embed_documents(TextInputs::from(["hi"]))
            .unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2]]);
        assert_eq!(transport.url(0), DEFAULT_ENDPOINT);
        assert_eq!(transport.body(0), json!({"model": "nova-embedding-v1", "input": ["hi"]}));

        let requests = transport.requests();
        let header = requests[0].header("authorization").unwrap();
        let token = header.strip_prefix("Bearer ").unwrap();
        let mut validation = Validation::default();
        validation.set_issuer(&["ak-123"]);
        let claims = decode::<Claims>(token, &DecodingKey::from_secret(b"sk-456"), &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.iss, "ak-123");
        assert_eq!(claims.exp - claims.nbf, 1805);
    }
}
