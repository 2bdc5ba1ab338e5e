//! Platform client configuration

use crate::error::{ClientError, Result};
use std::time::Duration;

/// Default HTTP request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the platform API lives and how to authenticate against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformClientConfig {
    /// HTTP base URL, e.g. `https://ctf.example.com`
    pub base_url: String,
    /// WebSocket base URL for log streams
    pub ws_url: String,
    /// Bearer token sent with every request
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl PlatformClientConfig {
    /// Config for `base_url`, with the WebSocket URL derived from it
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let ws_url = derive_ws_url(&base_url)?;
        Ok(Self {
            base_url,
            ws_url,
            auth_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.ws_url = ws_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CTF_API_URL")
            .map_err(|_| ClientError::Config("CTF_API_URL not set".to_string()))?;
        let mut config = Self::new(base_url)?;
        if let Ok(ws_url) = std::env::var("CTF_WS_URL") {
            config = config.with_ws_url(ws_url);
        }
        if let Ok(token) = std::env::var("CTF_AUTH_TOKEN") {
            if !token.is_empty() {
                config = config.with_auth_token(token);
            }
        }
        Ok(config)
    }
}

fn derive_ws_url(base_url: &str) -> Result<String> {
    if let Some(rest) = base_url.strip_prefix("https://") {
        Ok(format!("wss://{}", rest))
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        Ok(format!("ws://{}", rest))
    } else {
        Err(ClientError::Config(format!(
            "base URL must start with http:// or https://: {}",
            base_url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_derived_from_base() {
        let config = PlatformClientConfig::new("http://localhost:8080/").unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.ws_url, "ws://localhost:8080");

        let config = PlatformClientConfig::new("https://ctf.example.com").unwrap();
        assert_eq!(config.ws_url, "wss://ctf.example.com");
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let err = PlatformClientConfig::new("ftp://ctf.example.com").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = PlatformClientConfig::new("http://api:8080")
            .unwrap()
            .with_ws_url("ws://stream:9090/")
            .with_auth_token("secret")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.ws_url, "ws://stream:9090");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
