//! Blocking reqwest transport with configurable timeouts.

use super::{HttpRequest, HttpResponse, Timeouts, Transport, TransportError};
use crate::error::{ErrorKind, ProviderError, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for embedding requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an HTTP client with the default timeout.
pub fn create_client() -> Result<Client> {
    create_client_with_timeout(Timeouts::request(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
}

/// Create an HTTP client honouring the adapter's timeouts.
pub fn create_client_with_timeout(timeouts: Timeouts) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(connect) = timeouts.connect {
        builder = builder.connect_timeout(connect);
    }
    if let Some(request) = timeouts.request {
        builder = builder.timeout(request);
    }
    builder
        .build()
        .map_err(|e| ProviderError::with_source(ErrorKind::Config, "Failed to create HTTP client", e))
}

/// reqwest-backed [`Transport`].
///
/// The blocking client owns a private runtime, which must not be dropped
/// from async code. Dropping the transport inside a tokio runtime hands the
/// client to a plain thread instead.
pub struct ReqwestTransport {
    client: Option<Client>,
}

impl ReqwestTransport {
    /// Build a transport; with no timeouts configured the default applies.
    pub fn new(timeouts: Timeouts) -> Result<Self> {
        let client = if timeouts == Timeouts::default() {
            create_client()?
        } else {
            create_client_with_timeout(timeouts)?
        };
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client, e.g. one with a proxy configured.
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }
}

impl Drop for ReqwestTransport {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::spawn(move || drop(client));
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        debug!(url = %redacted(&request.url), "POST");

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TransportError::Client("transport already closed".to_string()))?;
        let mut builder = client
            .post(request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// URL without its query string, which may carry an access token.
fn redacted(url: &url::Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_redacted_drops_query() {
        let url = Url::parse("https://aip.example.com/embeddings/v1?access_token=secret").unwrap();
        assert_eq!(redacted(&url), "https://aip.example.com/embeddings/v1");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_send_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"model": "m", "input": ["a"]})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"data": [{"embedding": [1, 2]}]})),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/v1/embeddings", server.uri())).unwrap();
        let response = tokio::task::spawn_blocking(move || {
            let transport = ReqwestTransport::new(Timeouts::request(Duration::from_secs(5)))?;
            let mut request = HttpRequest::post(url)
                .json(&serde_json::json!({"model": "m", "input": ["a"]}));
            request
                .set_header("Content-Type", "application/json")
                .map_err(|e| ProviderError::with_source(ErrorKind::Config, "header", e))?;
            transport
                .send(&request)
                .map_err(|e| ProviderError::with_source(ErrorKind::Transport, "send", e))
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.body.contains("embedding"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_success_status_is_data_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/api/embed", server.uri())).unwrap();
        let response = tokio::task::spawn_blocking(move || {
            let transport = ReqwestTransport::new(Timeouts::default()).unwrap();
            transport.send(&HttpRequest::post(url)).unwrap()
        })
        .await
        .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "not found");
    }
}
