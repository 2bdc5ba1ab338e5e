//! Build log data types shared by the viewer and its collaborators

use crate::status::BuildStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of the line the builder publishes once a job has finished:
/// `BUILD_COMPLETE:<status>:<detail>`
pub const BUILD_COMPLETE_PREFIX: &str = "BUILD_COMPLETE:";

/// One build attempt of a challenge, as listed by the platform.
///
/// Lists arrive most recent first and are shown in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLogSummary {
    pub job_id: String,
    #[serde(default)]
    pub challenge_id: String,
    #[serde(default)]
    pub status: BuildStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BuildLogSummary {
    pub fn new(job_id: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            job_id: job_id.into(),
            challenge_id: String::new(),
            status,
            created_at: None,
            completed_at: None,
        }
    }

    pub fn with_challenge(mut self, challenge_id: impl Into<String>) -> Self {
        self.challenge_id = challenge_id.into();
        self
    }
}

/// Find the status of `job_id` in a summary list
pub fn status_of(summaries: &[BuildLogSummary], job_id: &str) -> Option<BuildStatus> {
    summaries
        .iter()
        .find(|summary| summary.job_id == job_id)
        .map(|summary| summary.status)
}

/// Full point-in-time read of a job's log
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogSnapshot {
    pub content: String,
    pub status: BuildStatus,
}

impl LogSnapshot {
    pub fn new(content: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            content: content.into(),
            status,
        }
    }
}

/// Incremental update pushed by the log stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogChunk {
    /// New text (may be empty)
    #[serde(default)]
    pub line: String,
    pub status: BuildStatus,
    #[serde(default)]
    pub is_complete: bool,
}

impl LogChunk {
    pub fn line(line: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            line: line.into(),
            status,
            is_complete: false,
        }
    }

    pub fn complete(line: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            line: line.into(),
            status,
            is_complete: true,
        }
    }

    /// Parse a `BUILD_COMPLETE:<status>:<detail>` marker line.
    ///
    /// Returns the final status and the detail text, or `None` for ordinary
    /// log lines.
    pub fn parse_completion_marker(raw: &str) -> Option<(BuildStatus, String)> {
        let rest = raw.trim_end().strip_prefix(BUILD_COMPLETE_PREFIX)?;
        let (status, detail) = rest.split_once(':').unwrap_or((rest, ""));
        Some((BuildStatus::from_wire(status), detail.to_string()))
    }
}

/// The challenge a set of build jobs belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub challenge_id: String,
    pub name: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub requires_instance: bool,
}

impl Challenge {
    pub fn new(challenge_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            challenge_id: challenge_id.into(),
            name: name.into(),
            genre: String::new(),
            points: 0,
            requires_instance: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of_finds_first_match() {
        let summaries = vec![
            BuildLogSummary::new("j2", BuildStatus::Building),
            BuildLogSummary::new("j1", BuildStatus::Success),
        ];
        assert_eq!(status_of(&summaries, "j1"), Some(BuildStatus::Success));
        assert_eq!(status_of(&summaries, "j3"), None);
    }

    #[test]
    fn test_parse_completion_marker() {
        let (status, detail) =
            LogChunk::parse_completion_marker("BUILD_COMPLETE:success:sha256:abc\n").unwrap();
        assert_eq!(status, BuildStatus::Success);
        assert_eq!(detail, "sha256:abc");

        let (status, detail) =
            LogChunk::parse_completion_marker("BUILD_COMPLETE:failed").unwrap();
        assert_eq!(status, BuildStatus::Failed);
        assert!(detail.is_empty());

        assert!(LogChunk::parse_completion_marker("Step 1/4 : FROM alpine").is_none());
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        let summary: BuildLogSummary =
            serde_json::from_str(r#"{"job_id":"j1","status":"pending"}"#).unwrap();
        assert_eq!(summary.job_id, "j1");
        assert_eq!(summary.status, BuildStatus::Pending);
        assert!(summary.challenge_id.is_empty());
        assert!(summary.created_at.is_none());
    }

    #[test]
    fn test_summary_parses_timestamps() {
        let summary: BuildLogSummary = serde_json::from_str(
            r#"{"job_id":"j1","challenge_id":"c1","status":"success",
                "created_at":"2026-01-02T03:04:05Z","completed_at":"2026-01-02T03:05:00Z"}"#,
        )
        .unwrap();
        assert_eq!(summary.challenge_id, "c1");
        assert!(summary.completed_at.unwrap() > summary.created_at.unwrap());
    }
}
