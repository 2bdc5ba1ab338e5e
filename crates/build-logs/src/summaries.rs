//! Job summary list loading

use crate::state::{ViewEvent, ViewStore};
use ctf_core::{BuildLogSource, SourceError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads a challenge's build attempts into the view state.
///
/// Shared by the controller (initial load, manual refresh) and by running
/// sessions, which refresh the list when a job reaches its final state.
#[derive(Clone)]
pub struct SummaryLoader {
    source: Arc<dyn BuildLogSource>,
    store: ViewStore,
}

impl SummaryLoader {
    pub fn new(source: Arc<dyn BuildLogSource>, store: ViewStore) -> Self {
        Self { source, store }
    }

    /// Reload the list. Failures leave the previous list in place.
    pub async fn refresh(&self, challenge_id: &str) -> Result<usize, SourceError> {
        self.store.dispatch(ViewEvent::SummariesLoadStarted);

        match self.source.list_summaries(challenge_id).await {
            Ok(summaries) => {
                let count = summaries.len();
                debug!(challenge_id = %challenge_id, count, "Build log list refreshed");
                self.store.dispatch(ViewEvent::SummariesLoaded(summaries));
                Ok(count)
            }
            Err(e) => {
                warn!(challenge_id = %challenge_id, error = %e, "Failed to load build logs");
                self.store.dispatch(ViewEvent::SummariesLoadFinished);
                Err(e)
            }
        }
    }
}
