//! Platform API wire format
//!
//! HTTP responses are JSON objects that may carry an `error_message`; a
//! non-empty message means the call failed even with a 200 status.
//!
//! Log stream frames are WebSocket text messages in one of two shapes:
//!
//! ```text
//! {"line": "Step 2/7 : RUN make\n", "status": "building", "is_complete": false}
//! Step 2/7 : RUN make
//! BUILD_COMPLETE:success:sha256:4f1c...
//! ```
//!
//! Raw lines are forwarded from the builder as published, without a
//! trailing newline.

use ctf_core::{BuildLogSummary, BuildStatus, Challenge, LogChunk, LogSnapshot, SourceError};
use serde::{Deserialize, Serialize};

/// `GET /api/v1/admin/challenges/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetChallengeResponse {
    #[serde(default)]
    pub challenge: Option<Challenge>,
    #[serde(default)]
    pub error_message: String,
}

/// `GET /api/v1/admin/challenges/{id}/build-logs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBuildLogsResponse {
    #[serde(default)]
    pub logs: Vec<BuildLogSummary>,
    #[serde(default)]
    pub error_message: String,
}

/// `GET /api/v1/admin/build-logs/{job_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetBuildLogResponse {
    #[serde(default)]
    pub log_content: String,
    #[serde(default)]
    pub status: BuildStatus,
    #[serde(default)]
    pub error_message: String,
}

/// Structured stream frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamFrame {
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub status: BuildStatus,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

pub fn challenge_path(challenge_id: &str) -> String {
    format!("/api/v1/admin/challenges/{}", challenge_id)
}

pub fn build_logs_path(challenge_id: &str) -> String {
    format!("/api/v1/admin/challenges/{}/build-logs", challenge_id)
}

pub fn build_log_path(job_id: &str) -> String {
    format!("/api/v1/admin/build-logs/{}", job_id)
}

pub fn stream_path(job_id: &str) -> String {
    format!("/api/v1/admin/build-logs/{}/stream", job_id)
}

/// Turn a non-empty `error_message` into a failure
pub fn check_error_message(message: &str) -> Result<(), SourceError> {
    let message = message.trim();
    if message.is_empty() {
        return Ok(());
    }
    if message.to_ascii_lowercase().contains("not found") {
        return Err(SourceError::NotFound(message.to_string()));
    }
    Err(SourceError::Remote(message.to_string()))
}

impl GetChallengeResponse {
    pub fn into_result(self, challenge_id: &str) -> Result<Challenge, SourceError> {
        check_error_message(&self.error_message)?;
        self.challenge
            .ok_or_else(|| SourceError::NotFound(challenge_id.to_string()))
    }
}

impl ListBuildLogsResponse {
    pub fn into_result(self) -> Result<Vec<BuildLogSummary>, SourceError> {
        check_error_message(&self.error_message)?;
        Ok(self.logs)
    }
}

impl GetBuildLogResponse {
    pub fn into_result(self) -> Result<LogSnapshot, SourceError> {
        check_error_message(&self.error_message)?;
        Ok(LogSnapshot::new(self.log_content, self.status))
    }
}

/// Decode one text frame of the log stream
pub fn decode_frame(text: &str) -> Result<LogChunk, SourceError> {
    if text.trim_start().starts_with('{') {
        let frame: StreamFrame = serde_json::from_str(text)?;
        check_error_message(&frame.error_message)?;
        return Ok(LogChunk {
            line: frame.line,
            status: frame.status,
            is_complete: frame.is_complete,
        });
    }

    if let Some((status, _detail)) = LogChunk::parse_completion_marker(text) {
        return Ok(LogChunk::complete("", status));
    }

    let mut line = text.to_string();
    if !line.ends_with('\n') {
        line.push('\n');
    }
    Ok(LogChunk::line(line, BuildStatus::Building))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_frame() {
        let chunk =
            decode_frame(r#"{"line":"done\n","status":"success","is_complete":true}"#).unwrap();
        assert_eq!(chunk, LogChunk::complete("done\n", BuildStatus::Success));
    }

    #[test]
    fn test_decode_raw_line_gets_newline() {
        let chunk = decode_frame("Step 1/4 : FROM alpine").unwrap();
        assert_eq!(
            chunk,
            LogChunk::line("Step 1/4 : FROM alpine\n", BuildStatus::Building)
        );
    }

    #[test]
    fn test_decode_completion_marker() {
        let chunk = decode_frame("BUILD_COMPLETE:failed:push failed: denied").unwrap();
        assert!(chunk.is_complete);
        assert_eq!(chunk.status, BuildStatus::Failed);
        assert_eq!(chunk.line, "");
    }

    #[test]
    fn test_decode_error_frame() {
        let err = decode_frame(r#"{"error_message":"job not found"}"#).unwrap_err();
        assert!(err.is_not_found());

        let err = decode_frame(r#"{"error_message":"redis unavailable"}"#).unwrap_err();
        assert_eq!(err, SourceError::Remote("redis unavailable".into()));
    }

    #[test]
    fn test_malformed_json_frame_is_protocol_error() {
        let err = decode_frame(r#"{"line": "#).unwrap_err();
        assert!(matches!(err, SourceError::Protocol(_)));
    }

    #[test]
    fn test_build_log_response() {
        let response: GetBuildLogResponse = serde_json::from_str(
            r#"{"log_content":"partial","status":"building","error_message":""}"#,
        )
        .unwrap();
        let snapshot = response.into_result().unwrap();
        assert_eq!(snapshot, LogSnapshot::new("partial", BuildStatus::Building));
    }

    #[test]
    fn test_list_response_with_error_message() {
        let response = ListBuildLogsResponse {
            logs: vec![],
            error_message: "permission denied".into(),
        };
        assert_eq!(
            response.into_result().unwrap_err(),
            SourceError::Remote("permission denied".into())
        );
    }

    #[test]
    fn test_missing_challenge_is_not_found() {
        let response = GetChallengeResponse::default();
        assert!(response.into_result("c1").unwrap_err().is_not_found());
    }
}
