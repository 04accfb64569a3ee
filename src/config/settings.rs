//! Configuration settings for embedbridge.

use crate::error::{ErrorKind, ProviderError, Result};
use crate::transport::Timeouts;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// The embedding backend to use.
    pub embedding: EmbeddingSettings,
}

/// Supported embedding backends.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
    Jina,
    SiliconFlow,
    Ollama,
    Qianfan,
    SenseNova,
    Tencent,
    Cohere,
    Voyage,
    Mistral,
    DashScope,
    Gemini,
    HuggingFace,
    Zhipu,
    MiniMax,
    Baichuan,
    Together,
    Nomic,
    Volcengine,
}

impl ProviderKind {
    /// Every kind, in declaration order.
    pub const ALL: [ProviderKind; 21] = [
        ProviderKind::OpenAi,
        ProviderKind::OpenAiCompatible,
        ProviderKind::AzureOpenAi,
        ProviderKind::Jina,
        ProviderKind::SiliconFlow,
        ProviderKind::Ollama,
        ProviderKind::Qianfan,
        ProviderKind::SenseNova,
        ProviderKind::Tencent,
        ProviderKind::Cohere,
        ProviderKind::Voyage,
        ProviderKind::Mistral,
        ProviderKind::DashScope,
        ProviderKind::Gemini,
        ProviderKind::HuggingFace,
        ProviderKind::Zhipu,
        ProviderKind::MiniMax,
        ProviderKind::Baichuan,
        ProviderKind::Together,
        ProviderKind::Nomic,
        ProviderKind::Volcengine,
    ];

    /// Identifier used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenAiCompatible => "openai-compatible",
            ProviderKind::AzureOpenAi => "azure-openai",
            ProviderKind::Jina => "jina",
            ProviderKind::SiliconFlow => "siliconflow",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Qianfan => "qianfan",
            ProviderKind::SenseNova => "sensenova",
            ProviderKind::Tencent => "tencent",
            ProviderKind::Cohere => "cohere",
            ProviderKind::Voyage => "voyage",
            ProviderKind::Mistral => "mistral",
            ProviderKind::DashScope => "dashscope",
            ProviderKind::Gemini => "gemini",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Zhipu => "zhipu",
            ProviderKind::MiniMax => "minimax",
            ProviderKind::Baichuan => "baichuan",
            ProviderKind::Together => "together",
            ProviderKind::Nomic => "nomic",
            ProviderKind::Volcengine => "volcengine",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let alias = match wanted.as_str() {
            "azure" => "azure-openai",
            "hunyuan" => "tencent",
            "ernie" | "baidu" => "qianfan",
            "qwen" | "aliyun" => "dashscope",
            "ark" | "doubao" => "volcengine",
            other => other,
        };
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == alias)
            .ok_or_else(|| format!("Unknown embedding provider: {}", s))
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embedding backend settings.
///
/// Only the fields a backend uses are read; the rest are ignored.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Backend to dispatch to.
    pub provider: ProviderKind,
    /// Model identifier. Each backend has its own default.
    pub model: Option<String>,
    /// Bearer/API key. Qianfan's client id.
    pub api_key: Option<SecretString>,
    /// Signing or client secret (Qianfan, SenseNova, Tencent).
    #[serde(alias = "secret_access_key")]
    pub secret_key: Option<SecretString>,
    /// Key id paired with `secret_key` (SenseNova access key id, Tencent SecretId).
    #[serde(alias = "secret_id")]
    pub access_key_id: Option<String>,
    /// Pre-issued OAuth access token (Qianfan) or Entra ID token (Azure).
    #[serde(alias = "azure_ad_token")]
    pub access_token: Option<SecretString>,
    /// Temporary-credential session token (Tencent).
    pub session_token: Option<SecretString>,
    /// Full endpoint URL override, or the Azure resource endpoint.
    pub endpoint: Option<String>,
    /// API root for backends addressed by base URL plus path.
    pub base_url: Option<String>,
    /// Cloud region (Tencent).
    pub region: Option<String>,
    /// Azure deployment name.
    pub deployment: Option<String>,
    /// Azure API version.
    pub api_version: Option<String>,
    /// MiniMax group id.
    pub group_id: Option<String>,
    /// Requested output dimensionality, where the backend supports it.
    pub dimensions: Option<u32>,
    /// End-user identifier forwarded to OpenAI-style backends.
    pub user: Option<String>,
    /// `OpenAI-Organization` header (OpenAI, Azure OpenAI).
    pub organization: Option<String>,
    /// Ollama: go straight to the per-item `/api/embeddings` endpoint.
    pub prefer_legacy_endpoint: bool,
    /// Whole-request timeout in seconds.
    pub timeout_secs: Option<f64>,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: Option<f64>,
    /// Timeout for token exchanges in seconds (Qianfan).
    pub token_timeout_secs: Option<f64>,
    /// Extra headers merged over the backend defaults.
    pub headers: HashMap<String, String>,
    /// Extra body fields merged after the core fields.
    pub request_options: Map<String, Value>,
}

impl EmbeddingSettings {
    /// Settings for `provider` with everything else defaulted.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Configured model, or the backend default.
    pub fn model_or(&self, default: &str) -> String {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    /// Transport timeouts from the configured seconds.
    pub fn timeouts(&self) -> Result<Timeouts> {
        Ok(Timeouts {
            connect: seconds("connect_timeout_secs", self.connect_timeout_secs)?,
            request: seconds("timeout_secs", self.timeout_secs)?,
        })
    }

    pub fn token_timeout(&self) -> Result<Option<Duration>> {
        seconds("token_timeout_secs", self.token_timeout_secs)
    }
}

fn seconds(field: &str, value: Option<f64>) -> Result<Option<Duration>> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|e| {
                ProviderError::with_source(
                    ErrorKind::Config,
                    format!("{} must be a non-negative number of seconds", field),
                    e,
                )
            })
        })
        .transpose()
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                ProviderError::with_source(
                    ErrorKind::Config,
                    format!("Failed to read {}", config_path.display()),
                    e,
                )
            })?;
            Self::from_toml(&content)
        } else {
            Ok(Settings::default())
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ProviderError::with_source(ErrorKind::Config, "Invalid configuration file", e)
        })
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("embedbridge")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}
