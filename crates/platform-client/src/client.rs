//! Platform API client
//!
//! Implements [`BuildLogSource`] and [`ChallengeSource`] against the
//! platform's admin API: JSON over HTTP for snapshots, job lists and
//! challenges, and a WebSocket per job for the live log stream.
//!
//! ```text
//! ┌──────────────┐  GET /build-logs/{job}   ┌──────────────────┐
//! │  Log viewer  │─────────────────────────►│  Platform Server │
//! │              │◄────WS /{job}/stream─────│                  │
//! └──────────────┘                          └──────────────────┘
//! ```

use crate::config::PlatformClientConfig;
use crate::error::{self, ClientError};
use crate::protocol::{
    build_log_path, build_logs_path, challenge_path, decode_frame, stream_path,
    GetBuildLogResponse, GetChallengeResponse, ListBuildLogsResponse,
};
use async_trait::async_trait;
use ctf_core::{
    BuildLogSource, BuildLogSummary, Challenge, ChallengeSource, LogSnapshot, LogStream,
    SourceError,
};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

/// HTTP + WebSocket client for the platform API
pub struct PlatformClient {
    config: PlatformClientConfig,
    http: reqwest::Client,
}

impl PlatformClient {
    pub fn new(config: PlatformClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(PlatformClientConfig::from_env()?)
    }

    pub fn config(&self) -> &PlatformClientConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(url = %url, "GET");

        let mut request = self.http.get(&url);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(error::transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Remote(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl BuildLogSource for PlatformClient {
    async fn fetch_snapshot(&self, job_id: &str) -> ctf_core::Result<LogSnapshot> {
        let response: GetBuildLogResponse = self.get_json(&build_log_path(job_id)).await?;
        response.into_result()
    }

    async fn open_stream(&self, job_id: &str) -> ctf_core::Result<LogStream> {
        let url = format!("{}{}", self.config.ws_url, stream_path(job_id));
        let mut request = url.as_str().into_client_request().map_err(error::websocket)?;
        if let Some(token) = &self.config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| SourceError::Transport(format!("invalid auth token: {}", e)))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(error::websocket)?;
        info!(job_id = %job_id, url = %url, "Build log stream connected");

        let chunks = ws_stream.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(decode_frame(&text)),
                Ok(Message::Binary(bytes)) => Some(
                    String::from_utf8(bytes)
                        .map_err(|e| SourceError::Protocol(e.to_string()))
                        .and_then(|text| decode_frame(&text)),
                ),
                Ok(_) => None,
                Err(e) => Some(Err(error::websocket(e))),
            }
        });

        Ok(chunks.boxed())
    }

    async fn list_summaries(&self, challenge_id: &str) -> ctf_core::Result<Vec<BuildLogSummary>> {
        let response: ListBuildLogsResponse = self.get_json(&build_logs_path(challenge_id)).await?;
        response.into_result()
    }
}

#[async_trait]
impl ChallengeSource for PlatformClient {
    async fn get_challenge(&self, challenge_id: &str) -> ctf_core::Result<Challenge> {
        let response: GetChallengeResponse = self.get_json(&challenge_path(challenge_id)).await?;
        response.into_result(challenge_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let config = PlatformClientConfig::new("http://127.0.0.1:9")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let client = PlatformClient::new(config).unwrap();

        let err = client.fetch_snapshot("j1").await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));

        let err = client.open_stream("j1").await.err().unwrap();
        assert!(matches!(err, SourceError::Transport(_)));
    }
}
