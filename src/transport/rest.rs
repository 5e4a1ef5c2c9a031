use crate::error::{Error, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const TOKEN_PATH: &str = "/v1/agent/token";

#[derive(Debug, Clone, Serialize)]
struct AccessTokenRequest<'a> {
    identity: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub token: String,
    pub expires_at: u64,
}

/// Minimal REST adapter for the agent backend: one call that exchanges the
/// worker API key for a session access token before the WebSocket connect.
#[derive(Clone, Debug)]
pub struct BackendRestAdapter {
    client: Client,
    base_url: String,
    auth_header: HeaderValue,
}

impl BackendRestAdapter {
    /// Create a new adapter for the given backend base URL and API key.
    ///
    /// # Errors
    /// Returns an error if the API key results in an invalid header or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut auth_header = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
        auth_header.set_sensitive(true);
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    /// Exchange the worker API key for a session access token.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails or the backend rejects the
    /// worker credential.
    pub async fn create_access_token(&self, identity: &str) -> Result<AccessTokenResponse> {
        let url = format!("{}{TOKEN_PATH}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.auth_header.clone())
            .json(&AccessTokenRequest { identity })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("token request failed ({status}): {body}")));
        }

        Ok(response.json::<AccessTokenResponse>().await?)
    }
}
