//! CTF Platform Client
//!
//! Build log and challenge access over the platform's admin API. The
//! [`PlatformClient`] is the production collaborator handed to the build log
//! viewer.
//!
//! ```rust,ignore
//! use ctf_platform_client::{PlatformClient, PlatformClientConfig};
//!
//! let config = PlatformClientConfig::new("https://ctf.example.com")?.with_auth_token(token);
//! let client = Arc::new(PlatformClient::new(config)?);
//! let viewer = ViewerController::new(client.clone(), client, ViewerConfig::default());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;

pub use client::PlatformClient;
pub use config::{PlatformClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::ClientError;
