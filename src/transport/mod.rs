//! HTTP transport boundary.
//!
//! Adapters build an [`HttpRequest`], hand it to a [`Transport`], and get back
//! the raw status and body. Status interpretation stays in the adapter so it
//! can recognise credential rejection and endpoint fallback.

mod http;
#[cfg(test)]
pub(crate) mod scripted;

pub use http::{create_client, create_client_with_timeout, ReqwestTransport, DEFAULT_TIMEOUT_SECS};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::error::{ErrorKind, ProviderError, Result};

/// Failure below the adapter: the request never produced a response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value for {0}")]
    InvalidHeader(String),

    #[error("client error: {0}")]
    Client(String),
}

/// Non-2xx response, kept as the cause of a transport-level `ProviderError`.
#[derive(Error, Debug)]
#[error("HTTP status {status}: {body}")]
pub struct StatusError {
    pub status: u16,
    pub body: String,
}

/// Per-adapter timeouts, passed through to the HTTP client untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    /// Limit on establishing the connection.
    pub connect: Option<Duration>,
    /// Limit on the whole request, including reading the body.
    pub request: Option<Duration>,
}

impl Timeouts {
    pub fn request(timeout: Duration) -> Self {
        Self {
            connect: None,
            request: Some(timeout),
        }
    }
}

/// An outgoing POST request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn post(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json(mut self, body: &serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: &str) -> std::result::Result<(), TransportError> {
        insert_header(&mut self.headers, name, value)
    }

    /// Append a query parameter to the URL.
    pub fn add_query(&mut self, name: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(name, value);
    }

    /// Value of a query parameter, if present.
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Header value as a string, if present and printable.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Raw response: status plus the undecoded body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort JSON view of the body, used for credential checks.
    pub fn json_value(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends requests to a backend. One instance per adapter.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Insert a header by name, replacing any existing value.
pub fn insert_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
) -> std::result::Result<(), TransportError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
    headers.insert(header_name, header_value);
    Ok(())
}

/// Build the header map for an adapter: JSON defaults overlaid with the
/// caller's extras. Invalid names or values fail at construction time.
pub fn build_headers(
    defaults: &[(&str, &str)],
    extra: &HashMap<String, String>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in defaults {
        insert_header(&mut headers, name, value).map_err(|e| {
            ProviderError::with_source(ErrorKind::Config, "invalid default header", e)
        })?;
    }
    let mut names: Vec<&String> = extra.keys().collect();
    names.sort();
    for name in names {
        insert_header(&mut headers, name, &extra[name]).map_err(|e| {
            ProviderError::with_source(
                ErrorKind::Config,
                format!("invalid custom header '{}'", name),
                e,
            )
        })?;
    }
    Ok(headers)
}
