//! The single parametrized adapter behind every provider.
//!
//! Vendors differ in endpoint layout, request body, response envelope and
//! credential lifecycle. An [`AdapterProfile`] captures those differences as
//! data; [`EmbeddingAdapter`] runs the shared request/refresh/extract/coerce
//! pipeline over it.

use super::coerce::coerce_vectors;
use super::extract::{extract, ExtractionRule};
use super::{Embedding, EmbeddingProvider};
use crate::credentials::CredentialManager;
use crate::error::{ErrorKind, ProviderError, Result};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, StatusError, Timeouts, Transport};
use reqwest::header::HeaderMap;
use serde_json::{json, Map, Value};
use std::slice;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How a batch of inputs becomes a JSON body.
#[derive(Clone, Copy)]
pub enum RequestShape {
    /// `{model_key: model, input_key: [texts]}`; the model is omitted when
    /// `model_key` is `None` (model carried in the URL).
    Flat {
        model_key: Option<&'static str>,
        input_key: &'static str,
    },
    /// As `Flat`, but for per-item endpoints taking one string.
    Scalar {
        model_key: Option<&'static str>,
        input_key: &'static str,
    },
    /// `{model, outer: {inner: [texts]}}`.
    Wrapped {
        outer: &'static str,
        inner: &'static str,
    },
    /// Built by a function of the model and the inputs.
    Custom(fn(&str, &[String]) -> Value),
}

impl RequestShape {
    /// `{model, input}`, the OpenAI layout.
    pub const fn model_input() -> Self {
        RequestShape::Flat {
            model_key: Some("model"),
            input_key: "input",
        }
    }

    fn build(&self, model: &str, texts: &[String]) -> Value {
        let mut body = Map::new();
        match self {
            RequestShape::Flat { model_key, input_key } => {
                if let Some(key) = model_key {
                    body.insert(key.to_string(), json!(model));
                }
                body.insert(input_key.to_string(), json!(texts));
            }
            RequestShape::Scalar { model_key, input_key } => {
                if let Some(key) = model_key {
                    body.insert(key.to_string(), json!(model));
                }
                let text = texts.first().map(String::as_str).unwrap_or_default();
                body.insert(input_key.to_string(), json!(text));
            }
            RequestShape::Wrapped { outer, inner } => {
                body.insert("model".to_string(), json!(model));
                let mut wrapped = Map::new();
                wrapped.insert(inner.to_string(), json!(texts));
                body.insert(outer.to_string(), Value::Object(wrapped));
            }
            RequestShape::Custom(build) => return build(model, texts),
        }
        Value::Object(body)
    }
}

/// An older endpoint used one input at a time.
#[derive(Clone)]
pub struct LegacyEndpoint {
    pub url: Url,
    pub shape: RequestShape,
    pub rules: &'static [ExtractionRule],
}

/// Which endpoint(s) a batch goes to.
#[derive(Clone)]
pub enum EndpointPlan {
    /// One request for the whole batch.
    Batch,
    /// One request per input, sequentially.
    PerItem,
    /// Batch endpoint first; a 404 switches this call to the legacy endpoint.
    Fallback {
        legacy: LegacyEndpoint,
        /// Skip the batch endpoint entirely.
        prefer_legacy: bool,
    },
}

/// Everything that distinguishes one backend from another.
pub struct AdapterProfile {
    pub(crate) name: &'static str,
    pub(crate) model: String,
    pub(crate) endpoint: Url,
    pub(crate) plan: EndpointPlan,
    pub(crate) shape: RequestShape,
    pub(crate) rules: &'static [ExtractionRule],
    pub(crate) credentials: Box<dyn CredentialManager>,
    pub(crate) headers: HeaderMap,
    pub(crate) request_options: Map<String, Value>,
    pub(crate) timeouts: Timeouts,
}

impl AdapterProfile {
    /// Profile for an OpenAI-style batch endpoint: `{model, input}` in,
    /// `data[].embedding` out.
    pub fn new(
        name: &'static str,
        model: impl Into<String>,
        endpoint: Url,
        credentials: Box<dyn CredentialManager>,
    ) -> Self {
        Self {
            name,
            model: model.into(),
            endpoint,
            plan: EndpointPlan::Batch,
            shape: RequestShape::model_input(),
            rules: &[ExtractionRule::DataArray],
            credentials,
            headers: HeaderMap::new(),
            request_options: Map::new(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn plan(mut self, plan: EndpointPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn shape(mut self, shape: RequestShape) -> Self {
        self.shape = shape;
        self
    }

    /// Response shapes to try, in priority order.
    pub fn rules(mut self, rules: &'static [ExtractionRule]) -> Self {
        self.rules = rules;
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Extra body fields, merged after the core fields. Copied here, so
    /// later changes to the caller's map have no effect.
    pub fn request_options(mut self, options: &Map<String, Value>) -> Self {
        self.request_options = options.clone();
        self
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

/// An [`EmbeddingProvider`] driven entirely by its [`AdapterProfile`].
pub struct EmbeddingAdapter {
    profile: AdapterProfile,
    transport: Box<dyn Transport>,
}

impl EmbeddingAdapter {
    /// Adapter over a reqwest transport honouring the profile's timeouts.
    pub fn new(profile: AdapterProfile) -> Result<Self> {
        let transport = ReqwestTransport::new(profile.timeouts)?;
        Ok(Self::with_transport(profile, Box::new(transport)))
    }

    /// Adapter over a caller-supplied transport.
    pub fn with_transport(profile: AdapterProfile, transport: Box<dyn Transport>) -> Self {
        Self { profile, transport }
    }

    pub fn profile(&self) -> &AdapterProfile {
        &self.profile
    }

    /// The URL the batch endpoint is called at.
    pub fn endpoint(&self) -> &Url {
        &self.profile.endpoint
    }

    fn body(&self, shape: &RequestShape, texts: &[String]) -> Value {
        let mut body = shape.build(&self.profile.model, texts);
        if let Value::Object(map) = &mut body {
            for (key, value) in &self.profile.request_options {
                map.insert(key.clone(), value.clone());
            }
        }
        body
    }

    /// Send `body`, refreshing the credential once if the backend rejects it.
    fn send(&self, url: &Url, body: &Value) -> Result<HttpResponse> {
        let name = self.profile.name;
        let credentials = self.profile.credentials.as_ref();
        let mut refreshed = false;

        loop {
            let mut request = HttpRequest::post(url.clone()).json(body);
            request.headers = self.profile.headers.clone();
            request.timeout = self.profile.timeouts.request;
            credentials.authorize(&mut request, self.transport.as_ref())?;

            let response = self.transport.send(&request).map_err(|e| {
                ProviderError::with_source(
                    ErrorKind::Transport,
                    format!("Failed to retrieve embeddings from {} provider", name),
                    e,
                )
            })?;

            let payload = response.json_value();
            if !credentials.is_rejection(response.status, payload.as_ref()) {
                return Ok(response);
            }
            if !refreshed && credentials.invalidate(&request) {
                warn!(provider = name, status = response.status, "Credential rejected, refreshing");
                refreshed = true;
                continue;
            }
            return Err(ProviderError::with_source(
                ErrorKind::Credential,
                format!("{} response still invalid after refreshing access token", name),
                StatusError {
                    status: response.status,
                    body: response.body,
                },
            ));
        }
    }

    /// Check status, parse JSON, and surface in-band API errors.
    fn decode(&self, response: HttpResponse) -> Result<Value> {
        let name = self.profile.name;
        if !response.is_success() {
            return Err(ProviderError::with_source(
                ErrorKind::Transport,
                format!("{} returned HTTP {}", name, response.status),
                StatusError {
                    status: response.status,
                    body: response.body,
                },
            ));
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|e| {
            ProviderError::with_source(
                ErrorKind::MalformedResponse,
                format!("Failed to parse {} embedding response body", name),
                e,
            )
        })?;

        if let Some(message) = api_error_message(&payload) {
            return Err(ProviderError::new(
                ErrorKind::Transport,
                format!("{} API error: {}", name, message),
            ));
        }
        Ok(payload)
    }

    fn vectors(
        &self,
        response: HttpResponse,
        rules: &[ExtractionRule],
        expected: usize,
    ) -> Result<Vec<Embedding>> {
        let payload = self.decode(response)?;
        let raw = extract(self.profile.name, &payload, rules, expected)?;
        coerce_vectors(self.profile.name, &raw)
    }

    fn embed_once(
        &self,
        url: &Url,
        shape: &RequestShape,
        rules: &[ExtractionRule],
        texts: &[String],
    ) -> Result<Vec<Embedding>> {
        let response = self.send(url, &self.body(shape, texts))?;
        self.vectors(response, rules, texts.len())
    }

    fn embed_each(
        &self,
        url: &Url,
        shape: &RequestShape,
        rules: &[ExtractionRule],
        texts: &[String],
    ) -> Result<Vec<Embedding>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.extend(self.embed_once(url, shape, rules, slice::from_ref(text))?);
        }
        Ok(vectors)
    }
}

impl EmbeddingProvider for EmbeddingAdapter {
    fn name(&self) -> &str {
        self.profile.name
    }

    fn model(&self) -> &str {
        &self.profile.model
    }

    #[instrument(skip(self, texts), fields(provider = self.profile.name, count = texts.len()))]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let profile = &self.profile;
        debug!("Generating embeddings for {} texts", texts.len());

        let vectors = match &profile.plan {
            EndpointPlan::Batch => {
                self.embed_once(&profile.endpoint, &profile.shape, profile.rules, texts)?
            }
            EndpointPlan::PerItem => {
                self.embed_each(&profile.endpoint, &profile.shape, profile.rules, texts)?
            }
            EndpointPlan::Fallback {
                legacy,
                prefer_legacy: true,
            } => self.embed_each(&legacy.url, &legacy.shape, legacy.rules, texts)?,
            EndpointPlan::Fallback { legacy, .. } => {
                let body = self.body(&profile.shape, texts);
                let response = self.send(&profile.endpoint, &body)?;
                if response.status == 404 {
                    info!(
                        provider = profile.name,
                        "Batch endpoint not found, falling back to legacy endpoint"
                    );
                    self.embed_each(&legacy.url, &legacy.shape, legacy.rules, texts)?
                } else {
                    self.vectors(response, profile.rules, texts.len())?
                }
            }
        };

        debug!("Generated {} embeddings", vectors.len());
        Ok(vectors)
    }
}

/// Error text carried in a successfully parsed body, for the envelopes the
/// supported backends use.
fn api_error_message(payload: &Value) -> Option<String> {
    let text = |v: &Value| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());

    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        return Some(match error.get("message") {
            Some(message) => text(message),
            None => text(error),
        });
    }
    if let Some(code) = payload.get("error_code").filter(|c| !c.is_null() && *c != 0) {
        let message = payload.get("error_msg").map(text).unwrap_or_default();
        return Some(format!("{} (code {})", message, code).trim_start().to_string());
    }
    if let Some(error) = payload.pointer("/Response/Error") {
        let code = error.get("Code").map(text).unwrap_or_default();
        let message = error.get("Message").map(text).unwrap_or_default();
        return Some(format!("{}: {}", code, message));
    }
    if let Some(status) = payload.pointer("/base_resp/status_code").filter(|c| *c != 0) {
        let message = payload
            .pointer("/base_resp/status_msg")
            .map(text)
            .unwrap_or_default();
        return Some(format!("{} (status {})", message, status));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Anonymous, AuthPlacement, CachedToken, ClientCredentials, StaticKey, TokenEndpoint};
    use crate::embedding::TextInputs;
    use crate::transport::scripted::{network_error, ScriptedTransport};
    use secrecy::Secret;
    use std::error::Error as _;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn openai_like(transport: &ScriptedTransport) -> EmbeddingAdapter {
        let profile = AdapterProfile::new(
            "Test",
            "test-model",
            url("https://api.example.com/v1/embeddings"),
            Box::new(StaticKey::bearer(Secret::new("sk".to_string()))),
        );
        EmbeddingAdapter::with_transport(profile, Box::new(transport.clone()))
    }

    #[test]
    fn test_batch_request_and_integer_coercion() {
        let transport = ScriptedTransport::new()
            .ok(json!({"data": [{"embedding": [1, 2, 3]}, {"embedding": [4, 5, 6]}]}));
        let adapter = openai_like(&transport);

        let vectors = adapter.embed_documents(TextInputs::from(["a", "b"])).unwrap();

        assert_eq!(vectors, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(transport.body(0), json!({"model": "test-model", "input": ["a", "b"]}));
        assert_eq!(transport.requests()[0].header("authorization"), Some("Bearer sk"));
    }

    #[test]
    fn test_request_options_are_copied_and_merged() {
        let transport = ScriptedTransport::new().ok(json!({"data": [{"embedding": [0.1]}]}));
        let mut options = Map::new();
        options.insert("dimensions".to_string(), json!(256));
        let profile = AdapterProfile::new("Test", "m", url("https://x.test/e"), Box::new(Anonymous))
            .request_options(&options);
        options.insert("late".to_string(), json!(true));
        let adapter = EmbeddingAdapter::with_transport(profile, Box::new(transport.clone()));

        adapter.embed_query("q").unwrap();
        assert_eq!(transport.body(0), json!({"model": "m", "input": ["q"], "dimensions": 256}));
    }

    #[test]
    fn test_transport_failure_keeps_cause() {
        let transport = ScriptedTransport::new().fail(network_error("boom"));
        let err = openai_like(&transport)
            .embed_documents(TextInputs::from(["a"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.source().unwrap().to_string().contains("boom"));
    }

    #[test]
    fn test_http_error_status_is_transport_error() {
        let transport = ScriptedTransport::new().respond(500, "internal");
        let err = openai_like(&transport).embed_query("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.source().unwrap().to_string().contains("500"));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let transport = ScriptedTransport::new().respond(200, "<html>");
        let err = openai_like(&transport).embed_query("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_in_band_error_is_reported() {
        let transport =
            ScriptedTransport::new().ok(json!({"error": {"message": "model not found"}}));
        let err = openai_like(&transport).embed_query("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("model not found"));
    }

    #[test]
    fn test_missing_and_non_numeric_vectors() {
        let transport = ScriptedTransport::new().ok(json!({"data": [{"embedding": [1.0]}]}));
        let err = openai_like(&transport)
            .embed_documents(TextInputs::from(["a", "b"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVector);

        let transport = ScriptedTransport::new().ok(json!({"data": [{"embedding": ["x"]}]}));
        let err = openai_like(&transport).embed_query("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonNumericVector);
    }

    #[test]
    fn test_per_item_plan_is_sequential() {
        let transport = ScriptedTransport::new()
            .ok(json!({"embedding": [1.0]}))
            .ok(json!({"embedding": [2.0]}));
        let profile = AdapterProfile::new("Test", "m", url("https://x.test/e"), Box::new(Anonymous))
            .plan(EndpointPlan::PerItem)
            .shape(RequestShape::Scalar {
                model_key: Some("model"),
                input_key: "prompt",
            })
            .rules(&[ExtractionRule::Single { key: "embedding" }]);
        let adapter = EmbeddingAdapter::with_transport(profile, Box::new(transport.clone()));

        let vectors = adapter.embed_documents(TextInputs::from(["one", "two"])).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![2.0]]);
        assert_eq!(transport.body(1), json!({"model": "m", "prompt": "two"}));
    }

    fn fallback_adapter(transport: &ScriptedTransport, prefer_legacy: bool) -> EmbeddingAdapter {
        let profile = AdapterProfile::new("Test", "m", url("http://local.test/api/embed"), Box::new(Anonymous))
            .rules(&[ExtractionRule::EmbeddingsArray])
            .plan(EndpointPlan::Fallback {
                legacy: LegacyEndpoint {
                    url: url("http://local.test/api/embeddings"),
                    shape: RequestShape::Scalar {
                        model_key: Some("model"),
                        input_key: "prompt",
                    },
                    rules: &[ExtractionRule::Single { key: "embedding" }],
                },
                prefer_legacy,
            });
        EmbeddingAdapter::with_transport(profile, Box::new(transport.clone()))
    }

    #[test]
    fn test_not_found_falls_back_per_item() {
        let transport = ScriptedTransport::new()
            .respond(404, "not found")
            .ok(json!({"embedding": [0.5, 0.6]}))
            .ok(json!({"embedding": [0.7, 0.8]}));
        let vectors = fallback_adapter(&transport, false)
            .embed_documents(TextInputs::from(["d1", "d2"]))
            .unwrap();

        assert_eq!(vectors, vec![vec![0.5, 0.6], vec![0.7, 0.8]]);
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.url(1), "http://local.test/api/embeddings");
        assert_eq!(transport.body(2), json!({"model": "m", "prompt": "d2"}));
    }

    #[test]
    fn test_other_errors_do_not_fall_back() {
        let transport = ScriptedTransport::new().respond(500, "down");
        let err = fallback_adapter(&transport, false).embed_query("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_prefer_legacy_skips_batch_endpoint() {
        let transport = ScriptedTransport::new().ok(json!({"embedding": [1, 2]}));
        let vectors = fallback_adapter(&transport, true).embed_documents(TextInputs::from(["x"])).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 2.0]]);
        assert_eq!(transport.url(0), "http://local.test/api/embeddings");
    }

    fn refreshing_adapter(transport: &ScriptedTransport) -> EmbeddingAdapter {
        let credentials = ClientCredentials::new(
            "Test",
            TokenEndpoint {
                url: url("https://auth.test/token"),
                timeout: None,
            },
        )
        .with_client("id", Secret::new("secret".to_string()))
        .with_token(CachedToken::new(Secret::new("stale".to_string()), None))
        .with_placement(AuthPlacement::Query("access_token".to_string()))
        .with_rejection_codes(&[110]);
        let profile = AdapterProfile::new("Test", "m", url("https://api.test/embed"), Box::new(credentials))
            .shape(RequestShape::Flat {
                model_key: None,
                input_key: "input",
            });
        EmbeddingAdapter::with_transport(profile, Box::new(transport.clone()))
    }

    #[test]
    fn test_rejected_token_is_refreshed_once() {
        let transport = ScriptedTransport::new()
            .ok(json!({"error_code": 110, "error_msg": "Access token invalid"}))
            .ok(json!({"access_token": "fresh", "expires_in": 3600}))
            .ok(json!({"data": [{"embedding": [0.1, 0.2]}]}));
        let vectors = refreshing_adapter(&transport).embed_query("hi").unwrap();

        assert_eq!(vectors, vec![0.1, 0.2]);
        let requests = transport.requests();
        assert_eq!(requests[0].query_value("access_token").as_deref(), Some("stale"));
        assert_eq!(requests[2].query_value("access_token").as_deref(), Some("fresh"));
        assert_eq!(transport.body(2), json!({"input": ["hi"]}));
    }

    #[test]
    fn test_second_rejection_is_fatal() {
        let transport = ScriptedTransport::new()
            .ok(json!({"error_code": 110}))
            .ok(json!({"access_token": "fresh"}))
            .ok(json!({"error_code": 110}));
        let err = refreshing_adapter(&transport).embed_query("hi").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Credential);
        assert!(err.message().contains("still invalid after refreshing"));
        assert_eq!(transport.request_count(), 3);
    }

    #[test]
    fn test_api_error_envelopes() {
        assert_eq!(
            api_error_message(&json!({"error_code": 336003, "error_msg": "bad input"})).unwrap(),
            "bad input (code 336003)"
        );
        assert_eq!(
            api_error_message(&json!({"Response": {"Error": {"Code": "AuthFailure", "Message": "nope"}}}))
                .unwrap(),
            "AuthFailure: nope"
        );
        assert!(api_error_message(&json!({"base_resp": {"status_code": 0}, "vectors": []})).is_none());
        assert!(api_error_message(&json!({"data": [], "error": null})).is_none());
    }
}
