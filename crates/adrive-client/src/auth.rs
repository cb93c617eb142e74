//! Token lifecycle for authenticated calls.
//!
//! Every authenticated request goes through [`CredentialGate::access_token`],
//! which refreshes lazily when the stored expiry has passed. Token state
//! lives behind a mutex and expiry is re-checked after acquisition, so
//! concurrent expired-token observers coalesce into a single refresh.

use chrono::{DateTime, Duration, Utc};
use reqwest::header;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{status_error, REFERER};
use crate::config::Config;
use crate::endpoints;
use crate::error::{DriveError, Result};
use crate::types::{TokenRequest, TokenResponse};

#[derive(Debug, Clone)]
struct Token {
    access_token: String,
    expire_at: DateTime<Utc>,
}

impl Token {
    fn expired(&self) -> bool {
        Utc::now() >= self.expire_at
    }
}

#[derive(Debug)]
pub(crate) struct CredentialGate {
    refresh_token: String,
    token_url: String,
    user_agent: String,
    token: Mutex<Option<Token>>,
}

impl CredentialGate {
    pub fn new(config: &Config) -> Self {
        Self {
            refresh_token: config.refresh_token.clone(),
            token_url: format!("{}{}", config.auth_base, endpoints::TOKEN),
            user_agent: config.user_agent.clone(),
            token: Mutex::new(None),
        }
    }

    /// Current access token, refreshing first if missing or expired.
    /// Refresh failures are fatal for the triggering call; no retry.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref() {
            if !current.expired() {
                return Ok(current.access_token.clone());
            }
        }

        let fresh = self.refresh(http).await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    async fn refresh(&self, http: &reqwest::Client) -> Result<Token> {
        debug!("refreshing access token");
        let request = TokenRequest {
            refresh_token: self.refresh_token.clone(),
            grant_type: "refresh_token".to_string(),
        };

        let res = http
            .post(&self.token_url)
            .header(header::REFERER, REFERER)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::CONTENT_TYPE, "application/json;charset=UTF-8")
            .json(&request)
            .send()
            .await?;

        if let Some(err) = status_error(&self.token_url, res.status()) {
            return Err(err);
        }

        let body = res.text().await?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| DriveError::ParseResponse {
                message: e.to_string(),
                body,
            })?;

        Ok(Token {
            access_token: parsed.access_token,
            expire_at: Utc::now() + Duration::seconds(parsed.expires_in),
        })
    }
}
