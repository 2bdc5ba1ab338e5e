//! Viewer configuration
//!
//! `ViewerConfig` is serde-friendly, with the poll interval written as plain
//! milliseconds so it can sit in a JSON/TOML settings file next to the
//! platform client settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval between poll snapshots
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Transport used to follow a job that is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveTransport {
    /// Server push stream of incremental chunks
    #[default]
    Stream,
    /// Periodic full snapshots
    Poll,
}

/// Build log viewer configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Interval between poll snapshots
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
    /// How running jobs are followed
    pub live_transport: LiveTransport,
    /// Refresh the job list on every poll tick after the first
    pub refresh_summaries_on_poll: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            live_transport: LiveTransport::Stream,
            refresh_summaries_on_poll: true,
        }
    }
}

impl ViewerConfig {
    pub fn polling(interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            live_transport: LiveTransport::Poll,
            ..Default::default()
        }
    }
}

/// Millisecond serde helper
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(2000));
        assert_eq!(config.live_transport, LiveTransport::Stream);
        assert!(config.refresh_summaries_on_poll);
    }

    #[test]
    fn test_polling_constructor() {
        let config = ViewerConfig::polling(Duration::from_millis(500));
        assert_eq!(config.live_transport, LiveTransport::Poll);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_config_serializes_interval_as_millis() {
        let config = ViewerConfig::polling(Duration::from_secs(3));
        let json = serde_json::to_value(&config).expect("serialize config");
        assert_eq!(json["poll_interval"], 3000);
        assert_eq!(json["live_transport"], "poll");

        let round_trip: ViewerConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(round_trip, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{"live_transport":"poll"}"#).expect("partial config");
        assert_eq!(config.live_transport, LiveTransport::Poll);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_negative_interval_rejected() {
        let err = serde_json::from_str::<ViewerConfig>(r#"{"poll_interval": -5}"#)
            .expect_err("negative intervals rejected");
        assert!(err.to_string().contains("invalid value"));
    }
}
