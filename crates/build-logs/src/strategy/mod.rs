//! Retrieval strategies
//!
//! A running job is followed either by the server push stream or by a
//! periodic snapshot poll. Both variants run against the same
//! [`SessionContext`], share one [`CancelToken`] and report the same
//! [`SessionOutcome`]; they differ in transport and in how the end of the
//! build is detected.
//!
//! | Variant      | Update kind     | End detection        | Transport error |
//! |--------------|-----------------|----------------------|-----------------|
//! | `PushStream` | append chunk    | `is_complete` chunk  | log and stop    |
//! | `PollLoop`   | replace content | terminal status      | log and retry   |

mod poll;
mod push;

use crate::buffer::{notify_scroll, ScrollHint};
use crate::cancel::CancelToken;
use crate::config::{LiveTransport, ViewerConfig};
use crate::state::{SessionId, ViewEvent, ViewStore};
use crate::summaries::SummaryLoader;
use ctf_core::{BuildLogSource, BuildStatus, SourceError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// How a live session follows its job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStrategy {
    PushStream,
    PollLoop {
        interval: Duration,
        refresh_summaries: bool,
    },
}

impl RetrievalStrategy {
    /// Strategy for a job in `status`, or `None` when the job is not running
    /// and a single snapshot is enough.
    pub fn for_status(status: BuildStatus, config: &ViewerConfig) -> Option<Self> {
        if !status.is_live() {
            return None;
        }
        Some(match config.live_transport {
            LiveTransport::Stream => RetrievalStrategy::PushStream,
            LiveTransport::Poll => RetrievalStrategy::PollLoop {
                interval: config.poll_interval,
                refresh_summaries: config.refresh_summaries_on_poll,
            },
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            RetrievalStrategy::PushStream => "push_stream",
            RetrievalStrategy::PollLoop { .. } => "poll_loop",
        }
    }

    /// Drive the session until the job ends, the transport gives up, or the
    /// session is cancelled.
    pub(crate) async fn run(self, ctx: &SessionContext) -> SessionOutcome {
        match self {
            RetrievalStrategy::PushStream => push::run(ctx).await,
            RetrievalStrategy::PollLoop {
                interval,
                refresh_summaries,
            } => poll::run(ctx, interval, refresh_summaries).await,
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The job reached its final state
    Completed,
    /// The stream closed without a completion chunk
    Ended,
    /// Transport failure; the last known status stays on screen
    Failed,
    /// Stopped by the owner
    Cancelled,
    /// Another session took over the viewer
    Superseded,
}

/// Everything a running session needs
pub(crate) struct SessionContext {
    pub(crate) id: SessionId,
    pub(crate) job_id: String,
    pub(crate) challenge_id: Option<String>,
    pub(crate) token: CancelToken,
    pub(crate) source: Arc<dyn BuildLogSource>,
    pub(crate) store: ViewStore,
    pub(crate) summaries: SummaryLoader,
    pub(crate) viewport: Option<Arc<dyn ScrollHint>>,
}

impl SessionContext {
    /// Apply a session event unless the session has been cancelled or
    /// replaced. Returns false when the update was discarded.
    pub(crate) fn apply(&self, event: ViewEvent) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.store.dispatch(event)
    }

    pub(crate) fn scroll_hint(&self) {
        notify_scroll(self.viewport.as_ref(), &self.job_id);
    }

    /// Refresh the job list when the session knows its challenge
    pub(crate) async fn refresh_summaries(&self) {
        let Some(challenge_id) = self.challenge_id.as_deref() else {
            return;
        };
        if self.token.is_cancelled() {
            return;
        }
        // Failures are logged by the loader; the session carries on.
        let _ = self.summaries.refresh(challenge_id).await;
    }

    /// Classify a transport error. Errors seen after cancellation are not
    /// failures and are not logged as such.
    pub(crate) fn transport_failure(&self, stage: &str, e: SourceError) -> SessionOutcome {
        if self.token.is_cancelled() || e.is_cancelled() {
            debug!(session = self.id, job_id = %self.job_id, stage, "Session aborted");
            return SessionOutcome::Cancelled;
        }
        error!(
            session = self.id,
            job_id = %self.job_id,
            stage,
            error = %e,
            "Build log transport failed"
        );
        SessionOutcome::Failed
    }

    /// Mark the session as ended in the view state
    pub(crate) fn finish(&self, outcome: SessionOutcome) {
        debug!(
            session = self.id,
            job_id = %self.job_id,
            outcome = ?outcome,
            "Session ended"
        );
        if outcome != SessionOutcome::Cancelled {
            self.store
                .dispatch(ViewEvent::SessionFinished { session: self.id });
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::testing::ScriptedSource;

    /// Context for session `id` on `job_id`, already opened as live in `store`
    pub(crate) fn live_context(
        source: Arc<ScriptedSource>,
        store: &ViewStore,
        id: SessionId,
        job_id: &str,
        challenge_id: Option<&str>,
    ) -> SessionContext {
        store.dispatch(ViewEvent::SessionOpened {
            session: id,
            job_id: job_id.to_string(),
            status: BuildStatus::Pending,
            live: true,
        });
        SessionContext {
            id,
            job_id: job_id.to_string(),
            challenge_id: challenge_id.map(str::to_string),
            token: CancelToken::new(),
            source: source.clone(),
            store: store.clone(),
            summaries: SummaryLoader::new(source, store.clone()),
            viewport: None,
        }
    }
}
