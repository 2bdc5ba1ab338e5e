//! Error types for the platform client

use ctf_core::SourceError;
use thiserror::Error;

/// Result type for client construction
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client setup errors. Request failures are reported as [`SourceError`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err.to_string())
    }
}

/// Map a request failure into the collaborator taxonomy
pub(crate) fn transport(err: reqwest::Error) -> SourceError {
    if err.status().map(|s| s.as_u16()) == Some(404) {
        return SourceError::NotFound(err.to_string());
    }
    if err.is_decode() {
        return SourceError::Protocol(err.to_string());
    }
    SourceError::Transport(err.to_string())
}

pub(crate) fn websocket(err: tokio_tungstenite::tungstenite::Error) -> SourceError {
    use tokio_tungstenite::tungstenite::Error as WsError;
    match err {
        WsError::Http(response) if response.status().as_u16() == 404 => {
            SourceError::NotFound("build log stream".to_string())
        }
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            SourceError::Transport("connection closed".to_string())
        }
        other => SourceError::Transport(other.to_string()),
    }
}
