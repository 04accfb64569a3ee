//! Backend constructors and the settings-driven registry.
//!
//! Each vendor module turns [`EmbeddingSettings`] into an
//! [`AdapterProfile`], validating required credentials before anything is
//! sent. [`build_provider`] picks the module by [`ProviderKind`].

pub mod azure;
pub mod baichuan;
pub mod cohere;
pub mod compatible;
pub mod dashscope;
pub mod gemini;
pub mod huggingface;
pub mod jina;
pub mod minimax;
pub mod mistral;
pub mod nomic;
pub mod ollama;
pub mod openai;
pub mod qianfan;
#[cfg(feature = "jwt")]
pub mod sensenova;
pub mod siliconflow;
#[cfg(feature = "tc3")]
pub mod tencent;
pub mod together;
pub mod volcengine;
pub mod voyage;
pub mod zhipu;

use crate::config::{EmbeddingSettings, ProviderKind};
use crate::credentials::{require_secret, StaticKey};
use crate::embedding::{AdapterProfile, EmbeddingAdapter, EmbeddingProvider, ExtractionRule};
use crate::error::{ProviderError, Result};
use crate::transport::{build_headers, Transport};
use serde_json::{json, Map, Value};
use tracing::info;
use url::Url;

pub(crate) const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");
pub(crate) const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");

/// Rules for OpenAI-compatible servers, which drift between the three layouts.
pub(crate) const TOLERANT_RULES: &[ExtractionRule] = &[
    ExtractionRule::DataArray,
    ExtractionRule::EmbeddingsArray,
    ExtractionRule::BareArray,
];

/// `OpenAI-Organization`, when configured.
pub(crate) fn organization_header(settings: &EmbeddingSettings) -> Option<(&'static str, &str)> {
    non_blank(settings.organization.as_deref()).map(|org| ("OpenAI-Organization", org))
}

/// Build the provider described by `settings`.
pub fn build_provider(settings: &EmbeddingSettings) -> Result<Box<dyn EmbeddingProvider>> {
    let adapter = EmbeddingAdapter::new(profile(settings)?)?;
    info!(
        provider = adapter.name(),
        model = adapter.model(),
        "Embedding provider ready"
    );
    Ok(Box::new(adapter))
}

/// Build the provider described by `settings` over a caller-supplied transport.
pub fn build_provider_with_transport(
    settings: &EmbeddingSettings,
    transport: Box<dyn Transport>,
) -> Result<Box<dyn EmbeddingProvider>> {
    Ok(Box::new(EmbeddingAdapter::with_transport(
        profile(settings)?,
        transport,
    )))
}

/// Resolve `settings` into an adapter profile.
pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    match settings.provider {
        ProviderKind::OpenAi => openai::profile(settings),
        ProviderKind::OpenAiCompatible => compatible::profile(settings),
        ProviderKind::AzureOpenAi => azure::profile(settings),
        ProviderKind::Jina => jina::profile(settings),
        ProviderKind::SiliconFlow => siliconflow::profile(settings),
        ProviderKind::Ollama => ollama::profile(settings),
        ProviderKind::Qianfan => qianfan::profile(settings),
        #[cfg(feature = "jwt")]
        ProviderKind::SenseNova => sensenova::profile(settings),
        #[cfg(not(feature = "jwt"))]
        ProviderKind::SenseNova => Err(capability_missing(settings.provider, "jwt")),
        #[cfg(feature = "tc3")]
        ProviderKind::Tencent => tencent::profile(settings),
        #[cfg(not(feature = "tc3"))]
        ProviderKind::Tencent => Err(capability_missing(settings.provider, "tc3")),
        ProviderKind::Cohere => cohere::profile(settings),
        ProviderKind::Voyage => voyage::profile(settings),
        ProviderKind::Mistral => mistral::profile(settings),
        ProviderKind::DashScope => dashscope::profile(settings),
        ProviderKind::Gemini => gemini::profile(settings),
        ProviderKind::HuggingFace => huggingface::profile(settings),
        ProviderKind::Zhipu => zhipu::profile(settings),
        ProviderKind::MiniMax => minimax::profile(settings),
        ProviderKind::Baichuan => baichuan::profile(settings),
        ProviderKind::Together => together::profile(settings),
        ProviderKind::Nomic => nomic::profile(settings),
        ProviderKind::Volcengine => volcengine::profile(settings),
    }
}

/// Whether this build can construct `kind`.
pub fn is_supported(kind: ProviderKind) -> bool {
    match kind {
        ProviderKind::SenseNova => cfg!(feature = "jwt"),
        ProviderKind::Tencent => cfg!(feature = "tc3"),
        _ => true,
    }
}

#[cfg_attr(all(feature = "jwt", feature = "tc3"), allow(dead_code))]
fn capability_missing(kind: ProviderKind, feature: &str) -> ProviderError {
    ProviderError::config(format!(
        "provider '{}' requires the '{}' feature, which this build does not include",
        kind, feature
    ))
}

pub(crate) fn parse_url(provider: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|e| {
        ProviderError::with_source(
            crate::error::ErrorKind::Config,
            format!("{} endpoint '{}' is not a valid URL", provider, raw),
            e,
        )
    })
}

/// `base` with any trailing slash removed, followed by `path`.
pub(crate) fn join_url(provider: &str, base: &str, path: &str) -> Result<Url> {
    parse_url(provider, &format!("{}{}", base.trim().trim_end_matches('/'), path))
}

/// The configured full endpoint, else `base_url` + `path`, else `default_base` + `path`.
pub(crate) fn resolve_endpoint(
    provider: &str,
    settings: &EmbeddingSettings,
    default_base: &str,
    path: &str,
) -> Result<Url> {
    if let Some(endpoint) = non_blank(settings.endpoint.as_deref()) {
        return parse_url(provider, endpoint);
    }
    let base = non_blank(settings.base_url.as_deref()).unwrap_or(default_base);
    join_url(provider, base, path)
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `dimensions`/`user` when set, then the caller's request options on top.
pub(crate) fn openai_options(settings: &EmbeddingSettings) -> Map<String, Value> {
    let mut options = Map::new();
    if let Some(dimensions) = settings.dimensions {
        options.insert("dimensions".to_string(), json!(dimensions));
    }
    if let Some(user) = non_blank(settings.user.as_deref()) {
        options.insert("user".to_string(), json!(user));
    }
    for (key, value) in &settings.request_options {
        options.insert(key.clone(), value.clone());
    }
    options
}

/// Vendor default fields, overridden by the caller's request options.
pub(crate) fn vendor_options(
    settings: &EmbeddingSettings,
    defaults: Vec<(&str, Value)>,
) -> Map<String, Value> {
    let mut options: Map<String, Value> = defaults
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    for (key, value) in &settings.request_options {
        options.insert(key.clone(), value.clone());
    }
    options
}

/// Apply the caller's headers, options and timeouts to a profile.
pub(crate) fn finish(
    profile: AdapterProfile,
    settings: &EmbeddingSettings,
    default_headers: &[(&str, &str)],
    options: &Map<String, Value>,
) -> Result<AdapterProfile> {
    Ok(profile
        .headers(build_headers(default_headers, &settings.headers)?)
        .request_options(options)
        .timeouts(settings.timeouts()?))
}

/// A bearer-key backend speaking the OpenAI embeddings dialect.
pub(crate) fn bearer_profile(
    name: &'static str,
    settings: &EmbeddingSettings,
    endpoint: Url,
    default_model: &str,
    default_headers: &[(&str, &str)],
) -> Result<AdapterProfile> {
    let key = require_secret(name, "api key", settings.api_key.as_ref())?;
    let profile = AdapterProfile::new(
        name,
        settings.model_or(default_model),
        endpoint,
        Box::new(StaticKey::bearer(key)),
    );
    finish(profile, settings, default_headers, &openai_options(settings))
}
