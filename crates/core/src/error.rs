//! Error types for build log collaborators

use thiserror::Error;

/// Result type for collaborator calls
pub type Result<T> = std::result::Result<T, SourceError>;

/// Collaborator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network or RPC failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Unknown job or challenge id
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform answered with an error message
    #[error("Remote error: {0}")]
    Remote(String),

    /// Payload could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Consumption was stopped by the caller
    #[error("Cancelled")]
    Cancelled,
}

impl SourceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SourceError::Cancelled)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(SourceError::Cancelled.is_cancelled());
        assert!(!SourceError::Transport("reset".into()).is_cancelled());
        assert!(SourceError::NotFound("j1".into()).is_not_found());
        assert!(!SourceError::Remote("denied".into()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::NotFound("job j9".to_string());
        assert_eq!(err.to_string(), "Not found: job j9");
    }

    #[test]
    fn test_from_serde_error() {
        let err: SourceError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SourceError::Protocol(_)));
    }
}
