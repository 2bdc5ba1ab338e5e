//! Collaborator traits the viewer consumes
//!
//! The viewer never talks to the network directly. It is handed a
//! [`BuildLogSource`] (and a [`ChallengeSource`] for the challenge header),
//! which the platform client implements over HTTP + WebSocket and tests
//! implement in memory.

use crate::error::Result;
use crate::types::{BuildLogSummary, Challenge, LogChunk, LogSnapshot};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Ordered, push-based sequence of log chunks.
///
/// Dropping the stream stops consumption and releases the transport.
pub type LogStream = BoxStream<'static, Result<LogChunk>>;

/// Read access to build jobs and their logs
#[async_trait]
pub trait BuildLogSource: Send + Sync {
    /// Point-in-time read of a job's full log and status
    async fn fetch_snapshot(&self, job_id: &str) -> Result<LogSnapshot>;

    /// Open the live chunk stream of a job
    async fn open_stream(&self, job_id: &str) -> Result<LogStream>;

    /// Build attempts of a challenge, most recent first
    async fn list_summaries(&self, challenge_id: &str) -> Result<Vec<BuildLogSummary>>;
}

/// Read access to challenge metadata
#[async_trait]
pub trait ChallengeSource: Send + Sync {
    async fn get_challenge(&self, challenge_id: &str) -> Result<Challenge>;
}
