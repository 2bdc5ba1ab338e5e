//! Session management
//!
//! [`SessionManager`] owns the single retrieval session of a viewer. Opening
//! a job stops whatever session is running before the new one starts, so two
//! sessions never write to the same buffer. A running job is followed on a
//! spawned task; a finished job is loaded once, inline.

use crate::buffer::ScrollHint;
use crate::cancel::CancelToken;
use crate::config::ViewerConfig;
use crate::state::{SessionId, ViewEvent, ViewStore};
use crate::strategy::{RetrievalStrategy, SessionContext, SessionOutcome};
use crate::summaries::SummaryLoader;
use ctf_core::{BuildLogSource, BuildStatus};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What a toggle ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenedAs {
    /// The job was already displayed and has been closed
    Closed,
    Streaming,
    Polling,
    /// Loaded once; no session left running
    Snapshot,
}

struct ActiveSession {
    id: SessionId,
    job_id: String,
    token: CancelToken,
    task: Option<JoinHandle<SessionOutcome>>,
}

/// Owner of the viewer's retrieval session
pub struct SessionManager {
    source: Arc<dyn BuildLogSource>,
    store: ViewStore,
    summaries: SummaryLoader,
    config: ViewerConfig,
    viewport: RwLock<Option<Arc<dyn ScrollHint>>>,
    challenge_id: RwLock<Option<String>>,
    current: Mutex<Option<ActiveSession>>,
    next_id: AtomicU64,
}

impl SessionManager {
    pub fn new(source: Arc<dyn BuildLogSource>, store: ViewStore, config: ViewerConfig) -> Self {
        let summaries = SummaryLoader::new(source.clone(), store.clone());
        Self {
            source,
            store,
            summaries,
            config,
            viewport: RwLock::new(None),
            challenge_id: RwLock::new(None),
            current: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    /// Challenge whose job list is refreshed when a session sees its job finish
    pub fn set_challenge(&self, challenge_id: Option<String>) {
        *self.challenge_id.write() = challenge_id;
    }

    /// Attach the presentation hook. Takes effect for sessions opened afterwards.
    pub fn attach_viewport(&self, viewport: Arc<dyn ScrollHint>) {
        *self.viewport.write() = Some(viewport);
    }

    /// Drop the presentation hook. Sessions already running keep theirs.
    pub fn detach_viewport(&self) {
        *self.viewport.write() = None;
    }

    /// Open `job_id`, or close it if it is the job on screen.
    ///
    /// A running job (`Pending`/`Building`) gets a live session and an empty
    /// log right away. Any other status is loaded with a single snapshot
    /// before this returns.
    pub async fn toggle(&self, job_id: &str, initial_status: BuildStatus) -> OpenedAs {
        if self.is_displayed(job_id) {
            self.stop();
            self.store.dispatch(ViewEvent::LogClosed);
            info!(job_id = %job_id, "Build log closed");
            return OpenedAs::Closed;
        }

        self.stop();

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancelToken::new();
        let strategy = RetrievalStrategy::for_status(initial_status, &self.config);

        self.store.dispatch(ViewEvent::SessionOpened {
            session: id,
            job_id: job_id.to_string(),
            status: initial_status,
            live: strategy.is_some(),
        });

        let ctx = SessionContext {
            id,
            job_id: job_id.to_string(),
            challenge_id: self.challenge_id.read().clone(),
            token: token.clone(),
            source: self.source.clone(),
            store: self.store.clone(),
            summaries: self.summaries.clone(),
            viewport: self.viewport.read().clone(),
        };

        match strategy {
            Some(strategy) => {
                info!(
                    session = id,
                    job_id = %job_id,
                    status = %initial_status,
                    strategy = strategy.name(),
                    "Build log session started"
                );
                let mut current = self.current.lock();
                let task = tokio::spawn(async move {
                    let outcome = strategy.run(&ctx).await;
                    ctx.finish(outcome);
                    outcome
                });
                *current = Some(ActiveSession {
                    id,
                    job_id: job_id.to_string(),
                    token,
                    task: Some(task),
                });
                match strategy {
                    RetrievalStrategy::PushStream => OpenedAs::Streaming,
                    RetrievalStrategy::PollLoop { .. } => OpenedAs::Polling,
                }
            }
            None => {
                *self.current.lock() = Some(ActiveSession {
                    id,
                    job_id: job_id.to_string(),
                    token,
                    task: None,
                });
                load_once(&ctx).await;

                let mut current = self.current.lock();
                if current.as_ref().map(|session| session.id) == Some(id) {
                    *current = None;
                }
                OpenedAs::Snapshot
            }
        }
    }

    /// Stop the running session, keeping the log on screen. No-op without one.
    pub fn cancel(&self) {
        if self.stop() {
            self.store.dispatch(ViewEvent::SessionCancelled);
        }
    }

    /// Wait for the running live session to end
    pub async fn wait(&self) -> Option<SessionOutcome> {
        let task = self
            .current
            .lock()
            .as_mut()
            .and_then(|session| session.task.take())?;
        match task.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Build log session task failed");
                None
            }
        }
    }

    /// Whether a session is still delivering updates
    pub fn is_active(&self) -> bool {
        self.active_job().is_some()
    }

    /// Job of the session still delivering updates
    pub fn active_job(&self) -> Option<String> {
        let current = self.current.lock();
        current
            .as_ref()
            .filter(|session| self.store.is_active(session.id))
            .map(|session| session.job_id.clone())
    }

    fn is_displayed(&self, job_id: &str) -> bool {
        let state = self.store.snapshot();
        if let Some(log) = &state.selected_log {
            return log.job_id == job_id;
        }
        // A one-shot load has no log yet but already owns the viewer.
        self.active_job().as_deref() == Some(job_id)
    }

    /// Cancel and forget the current session. The task is not aborted; it
    /// sees the token at its next suspension point.
    fn stop(&self) -> bool {
        let Some(session) = self.current.lock().take() else {
            return false;
        };
        session.token.cancel();
        debug!(session = session.id, job_id = %session.job_id, "Build log session stopped");
        true
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(session) = self.current.get_mut().take() {
            session.token.cancel();
        }
    }
}

async fn load_once(ctx: &SessionContext) {
    match ctx.source.fetch_snapshot(&ctx.job_id).await {
        Ok(snapshot) => {
            debug!(
                session = ctx.id,
                job_id = %ctx.job_id,
                bytes = snapshot.content.len(),
                "Build log loaded"
            );
            ctx.apply(ViewEvent::SnapshotReceived {
                session: ctx.id,
                job_id: ctx.job_id.clone(),
                snapshot,
            });
            ctx.finish(SessionOutcome::Completed);
        }
        Err(e) if e.is_cancelled() || ctx.token.is_cancelled() => {
            debug!(session = ctx.id, job_id = %ctx.job_id, "Build log load aborted");
        }
        Err(e) if e.is_not_found() => {
            warn!(job_id = %ctx.job_id, error = %e, "Build log not found");
            ctx.apply(ViewEvent::SnapshotFailed {
                session: ctx.id,
                job_id: ctx.job_id.clone(),
                message: format!("build log not found: {}", ctx.job_id),
                show_empty: true,
            });
            ctx.finish(SessionOutcome::Failed);
        }
        Err(e) => {
            error!(job_id = %ctx.job_id, error = %e, "Failed to load build log");
            ctx.apply(ViewEvent::SnapshotFailed {
                session: ctx.id,
                job_id: ctx.job_id.clone(),
                message: "failed to load build log".to_string(),
                show_empty: false,
            });
            ctx.finish(SessionOutcome::Failed);
        }
    }
}
