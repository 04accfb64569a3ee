//! Baidu Qianfan (ERNIE) embeddings.
//!
//! The model is part of the URL. Access tokens come from Baidu's OAuth
//! endpoint and travel as an `access_token` query parameter; an
//! `error_code` in the 110/111 family means the token went stale.

use super::{finish, non_blank, parse_url, ACCEPT_JSON, CONTENT_TYPE_JSON};
use crate::config::EmbeddingSettings;
use crate::credentials::{present, AuthPlacement, CachedToken, ClientCredentials, TokenEndpoint};
use crate::embedding::{AdapterProfile, RequestShape};
use crate::error::{ProviderError, Result};
use secrecy::ExposeSecret;

const NAME: &str = "Qianfan";

pub const DEFAULT_ENDPOINT: &str =
    "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop/embeddings/{model}";
pub const DEFAULT_MODEL: &str = "embedding-v1";
pub const TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";

/// `error_code` values meaning the access token is invalid or expired.
pub const TOKEN_ERROR_CODES: &[i64] = &[110, 111, 110010, 110011, 110021];

pub fn profile(settings: &EmbeddingSettings) -> Result<AdapterProfile> {
    let model = settings.model_or(DEFAULT_MODEL);
    let template = non_blank(settings.endpoint.as_deref()).unwrap_or(DEFAULT_ENDPOINT);
    let endpoint = parse_url(NAME, &template.replace("{model}", &model))?;

    let mut credentials = ClientCredentials::new(
        NAME,
        TokenEndpoint {
            url: parse_url(NAME, TOKEN_URL)?,
            timeout: settings.token_timeout()?,
        },
    )
    .with_placement(AuthPlacement::Query("access_token".to_string()))
    .with_rejection_codes(TOKEN_ERROR_CODES);

    let client_id = present(settings.api_key.as_ref());
    let client_secret = present(settings.secret_key.as_ref());
    let token = present(settings.access_token.as_ref());
    if let (Some(id), Some(secret)) = (client_id, client_secret) {
        credentials = credentials.with_client(id.expose_secret().trim(), secret);
    } else if token.is_none() {
        return Err(ProviderError::config(format!(
            "{} requires either an access_token or api_key/secret_key pair",
            NAME
        )));
    }
    if let Some(token) = token {
        credentials = credentials.with_token(CachedToken::new(token, None));
    }

    let profile = AdapterProfile::new(NAME, model, endpoint, Box::new(credentials)).shape(
        RequestShape::Flat {
            model_key: None,
            input_key: "input",
        },
    );
    finish(
        profile,
        settings,
        &[CONTENT_TYPE_JSON, ACCEPT_JSON],
        &settings.request_options,
    )
}
