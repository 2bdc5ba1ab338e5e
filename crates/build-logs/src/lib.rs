//! Build Log Viewer
//!
//! Follows the build log of a CTF challenge job. Provides:
//! - Live tailing of running jobs over a push stream or a snapshot poll
//! - One-shot loading of finished jobs
//! - A single cancellable session per viewer
//! - Observable view state for the host to render
//!
//! ```rust,ignore
//! use ctf_build_logs::{ViewerConfig, ViewerController};
//!
//! let viewer = ViewerController::new(source.clone(), source, ViewerConfig::default());
//! let mut updates = viewer.subscribe();
//!
//! viewer.enter(Some("c1"), None).await;
//! viewer.open("j1", None).await;
//! while updates.changed().await.is_ok() {
//!     render(&updates.borrow_and_update());
//! }
//! ```

pub mod buffer;
pub mod cancel;
pub mod config;
pub mod session;
pub mod state;
pub mod strategy;
pub mod summaries;
pub mod testing;
pub mod viewer;

pub use buffer::{notify_scroll, ScrollHint, SelectedLog, ViewportError};
pub use cancel::CancelToken;
pub use config::{LiveTransport, ViewerConfig, DEFAULT_POLL_INTERVAL};
pub use session::{OpenedAs, SessionManager};
pub use state::{SessionId, ViewEvent, ViewState, ViewStore};
pub use strategy::{RetrievalStrategy, SessionOutcome};
pub use summaries::SummaryLoader;
pub use viewer::ViewerController;
