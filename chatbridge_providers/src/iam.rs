use chatbridge_core::AssistantError;
use chrono::Utc;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::http::{check_status, transport};
use crate::retry::retry_with_backoff;

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

const GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Backoff for token requests that fail before reaching the token service.
const TOKEN_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    /// Unix seconds after which the token is fetched again.
    refresh_at: i64,
}

impl CachedToken {
    /// Tokens are renewed once 80% of their lifetime has passed.
    fn new(response: TokenResponse, now: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_at: now.saturating_add(response.expires_in.saturating_mul(4) / 5),
        }
    }

    const fn is_fresh(&self, now: i64) -> bool {
        now < self.refresh_at
    }
}

/// Exchanges an API key for bearer tokens and caches them until refresh time.
pub struct IamAuthenticator {
    client: Client,
    api_key: String,
    url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl IamAuthenticator {
    pub fn new(client: Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            url: DEFAULT_IAM_URL.to_string(),
            cached: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    /// Current bearer token, requesting a new one when missing or stale.
    pub async fn bearer_token(&self) -> Result<String, AssistantError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        debug!("Requesting IAM token from {}", self.url);
        let response = retry_with_backoff(
            || self.request_token(),
            &TOKEN_RETRY_DELAYS,
            |e| matches!(e, AssistantError::Transport(_)),
        )
        .await?;

        let token = CachedToken::new(response, Utc::now().timestamp());
        info!("Obtained IAM token, refresh scheduled at {}", token.refresh_at);
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<TokenResponse, AssistantError> {
        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", GRANT_TYPE), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(transport)?;

        check_status(response)
            .await?
            .json::<TokenResponse>()
            .await
            .map_err(transport)
    }
}
