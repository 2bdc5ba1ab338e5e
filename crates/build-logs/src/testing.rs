//! Scripted collaborator for tests
//!
//! [`ScriptedSource`] answers every collaborator call from queued scripts and
//! records each call as `"<kind>:<id>"` (`snapshot:j1`, `stream:j1`,
//! `summaries:c1`, `challenge:c1`) so tests can assert on what was fetched.

use async_trait::async_trait;
use ctf_core::{
    BuildLogSource, BuildLogSummary, Challenge, ChallengeSource, LogChunk, LogSnapshot,
    LogStream, SourceError,
};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::mpsc;

type ChunkResult = Result<LogChunk, SourceError>;

enum StreamScript {
    Items(Vec<ChunkResult>),
    Live(mpsc::UnboundedReceiver<ChunkResult>),
    OpenError(SourceError),
}

#[derive(Default)]
struct Scripts {
    snapshots: HashMap<String, VecDeque<Result<LogSnapshot, SourceError>>>,
    streams: HashMap<String, VecDeque<StreamScript>>,
    summaries: HashMap<String, Vec<BuildLogSummary>>,
    summaries_error: Option<SourceError>,
    challenges: HashMap<String, Result<Challenge, SourceError>>,
    snapshot_delay: Option<Duration>,
}

/// In-memory [`BuildLogSource`] and [`ChallengeSource`]
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<Scripts>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot answer for `job_id`. Answers are consumed in order;
    /// the last one keeps being returned once the queue is down to it.
    /// A job with nothing queued answers `NotFound`.
    pub fn push_snapshot(&self, job_id: &str, result: Result<LogSnapshot, SourceError>) {
        self.scripts
            .lock()
            .snapshots
            .entry(job_id.to_string())
            .or_default()
            .push_back(result);
    }

    /// Delay every snapshot answer, to model a slow request
    pub fn set_snapshot_delay(&self, delay: Duration) {
        self.scripts.lock().snapshot_delay = Some(delay);
    }

    /// Queue a stream that yields `items` and then closes
    pub fn set_stream(&self, job_id: &str, items: Vec<ChunkResult>) {
        self.push_stream(job_id, StreamScript::Items(items));
    }

    /// Queue a stream fed by hand. The stream stays open until the returned
    /// sender is dropped.
    pub fn live_stream(&self, job_id: &str) -> mpsc::UnboundedSender<ChunkResult> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push_stream(job_id, StreamScript::Live(rx));
        tx
    }

    /// Make the next stream open for `job_id` fail
    pub fn fail_stream_open(&self, job_id: &str, error: SourceError) {
        self.push_stream(job_id, StreamScript::OpenError(error));
    }

    fn push_stream(&self, job_id: &str, script: StreamScript) {
        self.scripts
            .lock()
            .streams
            .entry(job_id.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn set_summaries(&self, challenge_id: &str, summaries: Vec<BuildLogSummary>) {
        let mut scripts = self.scripts.lock();
        scripts.summaries_error = None;
        scripts
            .summaries
            .insert(challenge_id.to_string(), summaries);
    }

    /// Fail every summary request until the next `set_summaries`
    pub fn fail_summaries(&self, error: SourceError) {
        self.scripts.lock().summaries_error = Some(error);
    }

    pub fn set_challenge(&self, challenge: Challenge) {
        let id = challenge.challenge_id.clone();
        self.scripts.lock().challenges.insert(id, Ok(challenge));
    }

    pub fn fail_challenge(&self, challenge_id: &str, error: SourceError) {
        self.scripts
            .lock()
            .challenges
            .insert(challenge_id.to_string(), Err(error));
    }

    /// Every call made so far, oldest first
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of calls equal to `call`, e.g. `count("snapshot:j2")`
    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, kind: &str, id: &str) {
        self.calls.lock().push(format!("{}:{}", kind, id));
    }
}

#[async_trait]
impl BuildLogSource for ScriptedSource {
    async fn fetch_snapshot(&self, job_id: &str) -> ctf_core::Result<LogSnapshot> {
        self.record("snapshot", job_id);

        let (answer, delay) = {
            let mut scripts = self.scripts.lock();
            let delay = scripts.snapshot_delay;
            let answer = match scripts.snapshots.get_mut(job_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            (answer, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        answer.unwrap_or_else(|| Err(SourceError::NotFound(job_id.to_string())))
    }

    async fn open_stream(&self, job_id: &str) -> ctf_core::Result<LogStream> {
        self.record("stream", job_id);

        let script = self
            .scripts
            .lock()
            .streams
            .get_mut(job_id)
            .and_then(|queue| queue.pop_front());

        match script {
            Some(StreamScript::Items(items)) => Ok(stream::iter(items).boxed()),
            Some(StreamScript::Live(rx)) => Ok(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })
            .boxed()),
            Some(StreamScript::OpenError(e)) => Err(e),
            None => Err(SourceError::NotFound(job_id.to_string())),
        }
    }

    async fn list_summaries(&self, challenge_id: &str) -> ctf_core::Result<Vec<BuildLogSummary>> {
        self.record("summaries", challenge_id);

        let scripts = self.scripts.lock();
        if let Some(e) = &scripts.summaries_error {
            return Err(e.clone());
        }
        Ok(scripts
            .summaries
            .get(challenge_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ChallengeSource for ScriptedSource {
    async fn get_challenge(&self, challenge_id: &str) -> ctf_core::Result<Challenge> {
        self.record("challenge", challenge_id);

        self.scripts
            .lock()
            .challenges
            .get(challenge_id)
            .cloned()
            .unwrap_or_else(|| Err(SourceError::NotFound(challenge_id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctf_core::BuildStatus;

    #[tokio::test]
    async fn test_snapshot_queue_keeps_last_answer() {
        let source = ScriptedSource::new();
        source.push_snapshot("j2", Ok(LogSnapshot::new("partial", BuildStatus::Building)));
        source.push_snapshot("j2", Ok(LogSnapshot::new("done", BuildStatus::Failed)));

        assert_eq!(source.fetch_snapshot("j2").await.unwrap().content, "partial");
        assert_eq!(source.fetch_snapshot("j2").await.unwrap().content, "done");
        assert_eq!(source.fetch_snapshot("j2").await.unwrap().content, "done");
        assert_eq!(source.count("snapshot:j2"), 3);

        let err = source.fetch_snapshot("other").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_live_stream_follows_sender() {
        let source = ScriptedSource::new();
        let tx = source.live_stream("j1");
        let mut stream = source.open_stream("j1").await.unwrap();

        tx.send(Ok(LogChunk::line("a\n", BuildStatus::Building)))
            .unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().line, "a\n");

        drop(tx);
        assert!(stream.next().await.is_none());
        assert_eq!(source.calls(), vec!["stream:j1"]);
    }
}
