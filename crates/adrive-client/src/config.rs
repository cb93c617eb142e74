//! Client configuration

use std::time::Duration;

use crate::proof::ProofOffsetFn;

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.aliyundrive.com";
/// Default auth base URL (token refresh)
pub const DEFAULT_AUTH_BASE: &str = "https://auth.aliyundrive.com";

/// Browser user agent sent on every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.77 Safari/537.36";

/// Client configuration
#[derive(Clone)]
pub struct Config {
    /// Long-lived refresh credential exchanged for access tokens
    pub refresh_token: String,
    /// Operate on the album drive scope instead of the default drive
    pub is_album: bool,
    /// API base URL
    pub api_base: String,
    /// Auth base URL
    pub auth_base: String,
    /// User agent string
    pub user_agent: String,
    /// Request timeout, applied when the client builds its own transport
    pub timeout: Duration,
    /// Collaborator-supplied HTTP transport. When absent, the client
    /// builds one with `timeout` applied.
    pub http_client: Option<reqwest::Client>,
    /// Derives the proof-code sample offset from (access token, file
    /// size). The exact formula is specified by the service, not by this
    /// crate; without it dedup never triggers but uploads remain correct.
    pub proof_offset: Option<ProofOffsetFn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_token: String::new(),
            is_album: false,
            api_base: DEFAULT_API_BASE.to_string(),
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            http_client: None,
            proof_offset: None,
        }
    }
}

impl Config {
    /// Create a new config with the given refresh token
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            ..Default::default()
        }
    }

    /// Select the album drive scope
    pub fn with_album(mut self) -> Self {
        self.is_album = true;
        self
    }

    /// Override the API and auth base URLs
    pub fn with_endpoints(
        mut self,
        api_base: impl Into<String>,
        auth_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.auth_base = auth_base.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supply an HTTP transport
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Supply the service's proof-offset derivation
    pub fn with_proof_offset(mut self, f: ProofOffsetFn) -> Self {
        self.proof_offset = Some(f);
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("is_album", &self.is_album)
            .field("api_base", &self.api_base)
            .field("auth_base", &self.auth_base)
            .field("timeout", &self.timeout)
            .field("proof_offset", &self.proof_offset.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = Config::new("refresh-me")
            .with_album()
            .with_endpoints("http://127.0.0.1:9000", "http://127.0.0.1:9001")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.refresh_token, "refresh-me");
        assert!(config.is_album);
        assert_eq!(config.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_hides_refresh_token() {
        let config = Config::new("secret-refresh-token");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-refresh-token"));
    }
}
