//! Observable view state
//!
//! Everything the host renders lives in one [`ViewState`] value. It only
//! changes through [`ViewState::reduce`], a pure transition over
//! [`ViewEvent`]s, and is published to observers through a
//! `tokio::sync::watch` channel held by [`ViewStore`].
//!
//! Session events carry the id of the session that produced them. Once a
//! session is cancelled or replaced its id is no longer active and its late
//! events are rejected, so a stale chunk or snapshot can never touch the
//! buffer.

use crate::buffer::SelectedLog;
use ctf_core::{BuildLogSummary, BuildStatus, Challenge, LogSnapshot};
use std::sync::Arc;
use tokio::sync::watch;

/// Identity of one retrieval session
pub type SessionId = u64;

/// Everything a host needs to render the viewer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub challenge: Option<Challenge>,
    pub summaries: Vec<BuildLogSummary>,
    pub selected_log: Option<SelectedLog>,
    pub is_loading: bool,
    pub is_loading_logs: bool,
    pub is_loading_log_content: bool,
    /// Message of the last failed operation
    pub error: Option<String>,
    pub build_logs_expanded: bool,
    pub is_streaming_or_polling: bool,
    active_session: Option<SessionId>,
}

/// State transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ChallengeLoadStarted,
    ChallengeLoaded(Challenge),
    ChallengeLoadFinished,
    SummariesLoadStarted,
    SummariesLoaded(Vec<BuildLogSummary>),
    SummariesLoadFinished,
    LogListToggled,
    LogListExpanded,
    /// An operation failed; replaces any previous message
    Failed(String),

    /// A session took over the viewer. Live sessions show an empty log
    /// right away, one-shot loads show a loading flag until the snapshot
    /// arrives.
    SessionOpened {
        session: SessionId,
        job_id: String,
        status: BuildStatus,
        live: bool,
    },
    /// Push chunk: append `text` (possibly empty) and take `status`
    ChunkReceived {
        session: SessionId,
        text: String,
        status: BuildStatus,
    },
    /// Full snapshot: replace the log wholesale
    SnapshotReceived {
        session: SessionId,
        job_id: String,
        snapshot: LogSnapshot,
    },
    /// One-shot load failed. `show_empty` renders an empty log instead of none.
    SnapshotFailed {
        session: SessionId,
        job_id: String,
        message: String,
        show_empty: bool,
    },
    /// The session ended on its own
    SessionFinished { session: SessionId },
    /// The session was stopped; the log stays on screen
    SessionCancelled,
    /// The session was stopped and the log closed
    LogClosed,
}

impl ViewEvent {
    fn session(&self) -> Option<SessionId> {
        match self {
            ViewEvent::ChunkReceived { session, .. }
            | ViewEvent::SnapshotReceived { session, .. }
            | ViewEvent::SnapshotFailed { session, .. }
            | ViewEvent::SessionFinished { session } => Some(*session),
            _ => None,
        }
    }
}

impl ViewState {
    /// Session whose updates are currently accepted
    pub fn active_session(&self) -> Option<SessionId> {
        self.active_session
    }

    /// Whether `event` would be applied. Session events are only accepted
    /// from the active session, and chunks only when a log is displayed.
    pub fn accepts(&self, event: &ViewEvent) -> bool {
        if let Some(session) = event.session() {
            if self.active_session != Some(session) {
                return false;
            }
        }
        match event {
            ViewEvent::ChunkReceived { .. } => self.selected_log.is_some(),
            _ => true,
        }
    }

    /// Pure transition. Rejected events return the state unchanged.
    pub fn reduce(mut self, event: ViewEvent) -> ViewState {
        if !self.accepts(&event) {
            return self;
        }

        match event {
            ViewEvent::ChallengeLoadStarted => {
                self.is_loading = true;
                self.error = None;
            }
            ViewEvent::ChallengeLoaded(challenge) => {
                self.challenge = Some(challenge);
                self.error = None;
            }
            ViewEvent::ChallengeLoadFinished => {
                self.is_loading = false;
            }
            ViewEvent::SummariesLoadStarted => {
                self.is_loading_logs = true;
            }
            ViewEvent::SummariesLoaded(summaries) => {
                self.summaries = summaries;
                self.is_loading_logs = false;
                self.error = None;
            }
            ViewEvent::SummariesLoadFinished => {
                self.is_loading_logs = false;
            }
            ViewEvent::LogListToggled => {
                self.build_logs_expanded = !self.build_logs_expanded;
            }
            ViewEvent::LogListExpanded => {
                self.build_logs_expanded = true;
            }
            ViewEvent::Failed(message) => {
                self.error = Some(message);
            }
            ViewEvent::SessionOpened {
                session,
                job_id,
                status,
                live,
            } => {
                self.active_session = Some(session);
                if live {
                    self.selected_log = Some(SelectedLog::create(job_id, "", status));
                    self.is_loading_log_content = false;
                    self.is_streaming_or_polling = true;
                } else {
                    self.selected_log = None;
                    self.is_loading_log_content = true;
                    self.is_streaming_or_polling = false;
                }
            }
            ViewEvent::ChunkReceived { text, status, .. } => {
                self.selected_log = self
                    .selected_log
                    .as_ref()
                    .map(|current| current.append(&text, status));
                self.error = None;
            }
            ViewEvent::SnapshotReceived {
                job_id, snapshot, ..
            } => {
                self.selected_log = Some(match self.selected_log.as_ref() {
                    Some(current) if current.job_id == job_id => {
                        current.replace(snapshot.content, snapshot.status)
                    }
                    _ => SelectedLog::create(job_id, snapshot.content, snapshot.status),
                });
                self.is_loading_log_content = false;
                self.error = None;
            }
            ViewEvent::SnapshotFailed {
                job_id,
                message,
                show_empty,
                ..
            } => {
                self.selected_log = if show_empty {
                    Some(SelectedLog::create(job_id, "", BuildStatus::Unspecified))
                } else {
                    None
                };
                self.is_loading_log_content = false;
                self.error = Some(message);
            }
            ViewEvent::SessionFinished { .. } | ViewEvent::SessionCancelled => {
                self.end_session();
            }
            ViewEvent::LogClosed => {
                self.end_session();
                self.selected_log = crate::buffer::clear();
            }
        }

        self
    }

    fn end_session(&mut self) {
        self.active_session = None;
        self.is_streaming_or_polling = false;
        self.is_loading_log_content = false;
    }
}

/// Owner of the published [`ViewState`]
#[derive(Debug, Clone)]
pub struct ViewStore {
    sender: Arc<watch::Sender<ViewState>>,
}

impl ViewStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ViewState::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.sender.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ViewState {
        self.sender.borrow().clone()
    }

    /// Apply `event`. Returns false when the event was rejected as stale.
    pub fn dispatch(&self, event: ViewEvent) -> bool {
        self.sender.send_if_modified(|state| {
            if !state.accepts(&event) {
                return false;
            }
            let current = std::mem::take(state);
            *state = current.reduce(event);
            true
        })
    }

    pub fn is_active(&self, session: SessionId) -> bool {
        self.sender.borrow().active_session == Some(session)
    }
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}
