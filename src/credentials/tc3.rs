//! Tencent Cloud TC3-HMAC-SHA256 request signing.

use super::CredentialManager;
use crate::error::{ErrorKind, ProviderError, Result};
use crate::transport::{HttpRequest, Transport};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "TC3-HMAC-SHA256";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host;x-tc-action";

/// Signs every request with the caller's SecretId/SecretKey pair.
pub struct Tc3Signer {
    secret_id: String,
    secret_key: SecretString,
    session_token: Option<SecretString>,
    action: String,
    version: String,
    region: String,
}

impl Tc3Signer {
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: SecretString,
        action: &str,
        version: &str,
        region: &str,
    ) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key,
            session_token: None,
            action: action.to_string(),
            version: version.to_string(),
            region: region.to_string(),
        }
    }

    /// Temporary credentials carry a session token alongside the key pair.
    pub fn with_session_token(mut self, token: Option<SecretString>) -> Self {
        self.session_token = token;
        self
    }

    /// Sign `request` as of `now`.
    pub(crate) fn sign_at(&self, request: &mut HttpRequest, now: DateTime<Utc>) -> Result<()> {
        let host = host_header(&request.url)?;
        let service = host.split('.').next().unwrap_or_default().to_string();
        let timestamp = now.timestamp();
        let date = now.format("%Y-%m-%d").to_string();

        let canonical_request = self.canonical_request(request, &host);
        let scope = format!("{}/{}/tc3_request", date, service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let secret_date = hmac(
            format!("TC3{}", self.secret_key.expose_secret()).as_bytes(),
            date.as_bytes(),
        )?;
        let secret_service = hmac(&secret_date, service.as_bytes())?;
        let secret_signing = hmac(&secret_service, b"tc3_request")?;
        let signature = hex::encode(hmac(&secret_signing, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.secret_id, scope, SIGNED_HEADERS, signature
        );

        let timestamp = timestamp.to_string();
        let mut headers = vec![
            ("Authorization", authorization.as_str()),
            ("Content-Type", CONTENT_TYPE),
            ("Host", host.as_str()),
            ("X-TC-Action", self.action.as_str()),
            ("X-TC-Timestamp", timestamp.as_str()),
            ("X-TC-Version", self.version.as_str()),
            ("X-TC-Region", self.region.as_str()),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("X-TC-Token", token.expose_secret()));
        }
        for (name, value) in headers {
            request.set_header(name, value).map_err(|e| {
                ProviderError::with_source(ErrorKind::Credential, "TC3 signature header rejected", e)
            })?;
        }
        Ok(())
    }
}

impl Tc3Signer {
    fn canonical_request(&self, request: &HttpRequest, host: &str) -> String {
        let payload = request.body.as_deref().unwrap_or("");
        format!(
            "POST\n{}\n{}\ncontent-type:{}\nhost:{}\nx-tc-action:{}\n\n{}\n{}",
            request.url.path(),
            request.url.query().unwrap_or(""),
            CONTENT_TYPE,
            host,
            self.action.to_lowercase(),
            SIGNED_HEADERS,
            sha256_hex(payload.as_bytes())
        )
    }
}

impl CredentialManager for Tc3Signer {
    fn authorize(&self, request: &mut HttpRequest, _transport: &dyn Transport) -> Result<()> {
        self.sign_at(request, Utc::now())
    }
}

/// Host as sent on the wire, with a non-default port.
fn host_header(url: &url::Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| ProviderError::credential("TC3 signing needs a host"))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ProviderError::with_source(ErrorKind::Credential, "HMAC key rejected", e))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use secrecy::Secret;
    use serde_json::json;
    use url::Url;

    fn signer() -> Tc3Signer {
        Tc3Signer::new(
            "AKIDEXAMPLE",
            Secret::new("example-key".to_string()),
            "GetEmbedding",
            "2023-09-01",
            "ap-guangzhou",
        )
    }

    fn signed(signer: &Tc3Signer, input: &str) -> HttpRequest {
        signed_at(signer, "https://hunyuan.tencentcloudapi.com/", input)
    }

    fn signed_at(signer: &Tc3Signer, endpoint: &str, input: &str) -> HttpRequest {
        let mut request = HttpRequest::post(Url::parse(endpoint).unwrap()).json(&json!({"Input": input}));
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        signer.sign_at(&mut request, now).unwrap();
        request
    }

    #[test]
    fn test_authorization_layout() {
        let request = signed(&signer(), "hello");
        let auth = request.header("authorization").unwrap();

        assert!(auth.starts_with(
            "TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2024-05-01/hunyuan/tc3_request, \
             SignedHeaders=content-type;host;x-tc-action, Signature="
        ));
        let signature = auth.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(request.header("x-tc-action"), Some("GetEmbedding"));
        assert_eq!(request.header("x-tc-version"), Some("2023-09-01"));
        assert_eq!(request.header("x-tc-region"), Some("ap-guangzhou"));
        assert_eq!(request.header("x-tc-timestamp"), Some("1714552200"));
        assert_eq!(request.header("host"), Some("hunyuan.tencentcloudapi.com"));
        assert_eq!(request.header("content-type"), Some(CONTENT_TYPE));
        assert!(request.header("x-tc-token").is_none());
    }

    #[test]
    fn test_signature_covers_payload() {
        let s = signer();
        let a = signed(&s, "hello");
        let b = signed(&s, "hello");
        let c = signed(&s, "world");
        assert_eq!(a.header("authorization"), b.header("authorization"));
        assert_ne!(a.header("authorization"), c.header("authorization"));
    }

    #[test]
    fn test_session_token_header() {
        let s = signer().with_session_token(Some(Secret::new("token123".to_string())));
        let request = signed(&s, "hello");
        assert_eq!(request.header("x-tc-token"), Some("token123"));
    }

    #[test]
    fn test_canonical_request_follows_endpoint() {
        let s = signer();
        let request = signed_at(&s, "https://hunyuan.tencentcloudapi.com:8443/proxy?x=1", "hello");
        assert_eq!(request.header("host"), Some("hunyuan.tencentcloudapi.com:8443"));

        let canonical = s.canonical_request(&request, "hunyuan.tencentcloudapi.com:8443");
        let lines: Vec<&str> = canonical.lines().collect();
        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/proxy");
        assert_eq!(lines[2], "x=1");
        assert_eq!(lines[4], "host:hunyuan.tencentcloudapi.com:8443");
        assert_eq!(lines[5], "x-tc-action:getembedding");

        let auth = request.header("authorization").unwrap();
        assert!(auth.contains("Credential=AKIDEXAMPLE/2024-05-01/hunyuan/tc3_request"));
        let default_auth = signed(&s, "hello");
        assert_ne!(Some(auth), default_auth.header("authorization"));
    }

    #[test]
    fn test_default_port_is_not_in_host() {
        let request = signed_at(&signer(), "https://hunyuan.tencentcloudapi.com:443/", "hello");
        assert_eq!(request.header("host"), Some("hunyuan.tencentcloudapi.com"));
    }
}
