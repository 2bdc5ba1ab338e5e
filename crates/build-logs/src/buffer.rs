//! Log buffer for the job currently on screen

use ctf_core::BuildStatus;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// The log being displayed. At most one per viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedLog {
    pub job_id: String,
    pub content: String,
    pub status: BuildStatus,
}

impl SelectedLog {
    pub fn create(
        job_id: impl Into<String>,
        initial_content: impl Into<String>,
        status: BuildStatus,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            content: initial_content.into(),
            status,
        }
    }

    /// New snapshot with `text` appended and the status replaced
    pub fn append(&self, text: &str, status: BuildStatus) -> Self {
        let mut content = String::with_capacity(self.content.len() + text.len());
        content.push_str(&self.content);
        content.push_str(text);
        Self {
            job_id: self.job_id.clone(),
            content,
            status,
        }
    }

    /// New snapshot with the whole content replaced
    pub fn replace(&self, content: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            job_id: self.job_id.clone(),
            content: content.into(),
            status,
        }
    }
}

/// Nothing selected
pub fn clear() -> Option<SelectedLog> {
    None
}

/// Viewport errors. Only ever logged.
#[derive(Error, Debug)]
pub enum ViewportError {
    #[error("no viewport attached")]
    Detached,

    #[error("viewport error: {0}")]
    Other(String),
}

/// Presentation hook asked to scroll to the newest output
pub trait ScrollHint: Send + Sync {
    fn scroll_to_latest(&self) -> Result<(), ViewportError>;
}

/// Best-effort scroll notification; failures are swallowed.
pub fn notify_scroll(viewport: Option<&Arc<dyn ScrollHint>>, job_id: &str) {
    let result = match viewport {
        Some(viewport) => viewport.scroll_to_latest(),
        None => Err(ViewportError::Detached),
    };
    if let Err(e) = result {
        debug!(job_id = %job_id, error = %e, "Scroll hint skipped");
    }
}
