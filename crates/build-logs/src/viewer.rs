//! Viewer controller
//!
//! Entry point for a host. A host calls [`ViewerController::enter`] when it
//! navigates to a challenge, [`ViewerController::open`] when the user picks
//! a job, and [`ViewerController::teardown`] when it navigates away. It
//! renders whatever [`ViewerController::subscribe`] publishes.

use crate::buffer::ScrollHint;
use crate::config::ViewerConfig;
use crate::session::{OpenedAs, SessionManager};
use crate::state::{ViewEvent, ViewState, ViewStore};
use crate::summaries::SummaryLoader;
use ctf_core::{status_of, BuildLogSource, BuildStatus, ChallengeSource};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

pub struct ViewerController {
    challenges: Arc<dyn ChallengeSource>,
    store: ViewStore,
    summaries: SummaryLoader,
    sessions: SessionManager,
}

impl ViewerController {
    pub fn new(
        source: Arc<dyn BuildLogSource>,
        challenges: Arc<dyn ChallengeSource>,
        config: ViewerConfig,
    ) -> Self {
        let store = ViewStore::new();
        let summaries = SummaryLoader::new(source.clone(), store.clone());
        let sessions = SessionManager::new(source, store.clone(), config);
        Self {
            challenges,
            store,
            summaries,
            sessions,
        }
    }

    /// Load a challenge and its job list, then open `target_job` if given.
    pub async fn enter(&self, challenge_id: Option<&str>, target_job: Option<&str>) {
        let Some(challenge_id) = challenge_id.filter(|id| !id.is_empty()) else {
            self.store
                .dispatch(ViewEvent::Failed("no challenge id given".to_string()));
            return;
        };

        self.store.dispatch(ViewEvent::ChallengeLoadStarted);

        match self.challenges.get_challenge(challenge_id).await {
            Ok(challenge) => {
                info!(challenge_id = %challenge_id, name = %challenge.name, "Challenge loaded");
                self.store.dispatch(ViewEvent::ChallengeLoaded(challenge));
                self.sessions.set_challenge(Some(challenge_id.to_string()));

                if self.summaries.refresh(challenge_id).await.is_err() {
                    self.store
                        .dispatch(ViewEvent::Failed("failed to load build logs".to_string()));
                }

                if let Some(job_id) = target_job {
                    self.store.dispatch(ViewEvent::LogListExpanded);
                    self.open(job_id, None).await;
                }
            }
            Err(e) if e.is_not_found() => {
                warn!(challenge_id = %challenge_id, "Challenge not found");
                self.store
                    .dispatch(ViewEvent::Failed("challenge not found".to_string()));
            }
            Err(e) => {
                error!(challenge_id = %challenge_id, error = %e, "Failed to load challenge");
                self.store
                    .dispatch(ViewEvent::Failed("failed to load challenge".to_string()));
            }
        }

        self.store.dispatch(ViewEvent::ChallengeLoadFinished);
    }

    /// Open (or close, if already shown) the log of `job_id`.
    ///
    /// Without a known status the job list is consulted; a job missing from
    /// it is treated as `Unspecified` and loaded once.
    pub async fn open(&self, job_id: &str, known_status: Option<BuildStatus>) -> OpenedAs {
        let status = known_status
            .or_else(|| status_of(&self.store.snapshot().summaries, job_id))
            .unwrap_or_default();
        self.sessions.toggle(job_id, status).await
    }

    /// Reload the job list of the current challenge. No-op before a
    /// challenge has loaded.
    pub async fn refresh_summaries(&self) {
        let Some(challenge_id) = self
            .store
            .snapshot()
            .challenge
            .map(|challenge| challenge.challenge_id)
        else {
            return;
        };
        if self.summaries.refresh(&challenge_id).await.is_err() {
            self.store
                .dispatch(ViewEvent::Failed("failed to load build logs".to_string()));
        }
    }

    /// Expand or collapse the job list
    pub fn toggle_build_logs(&self) {
        self.store.dispatch(ViewEvent::LogListToggled);
    }

    /// Stop the running session. Late updates from it are discarded.
    pub fn teardown(&self) {
        self.sessions.cancel();
        info!("Build log viewer torn down");
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.store.snapshot()
    }

    pub fn attach_viewport(&self, viewport: Arc<dyn ScrollHint>) {
        self.sessions.attach_viewport(viewport);
    }

    pub fn detach_viewport(&self) {
        self.sessions.detach_viewport();
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
