//! Build job status model
//!
//! The builder reports a job as `pending` while it waits in the queue,
//! `building` while the image is produced, and finally `success` or `failed`.
//! Anything else (including an empty string) is treated as unknown.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Status of one build job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildStatus {
    /// Unknown or not yet initialized. Never produced by a successful fetch.
    #[default]
    Unspecified,
    Pending,
    Building,
    Success,
    Failed,
}

impl BuildStatus {
    /// Wire name used by the platform API
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Unspecified => "unspecified",
            BuildStatus::Pending => "pending",
            BuildStatus::Building => "building",
            BuildStatus::Success => "success",
            BuildStatus::Failed => "failed",
        }
    }

    /// True iff no further updates are expected for the job
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Success | BuildStatus::Failed)
    }

    /// True while the job is queued or running and worth tailing live
    pub fn is_live(&self) -> bool {
        matches!(self, BuildStatus::Pending | BuildStatus::Building)
    }

    /// Presentation classification (label + style)
    pub fn classify(&self) -> StatusClass {
        let (label, style) = match self {
            BuildStatus::Success => ("Success", StyleKind::Success),
            BuildStatus::Failed => ("Failed", StyleKind::Failed),
            BuildStatus::Building => ("Building", StyleKind::Building),
            BuildStatus::Pending => ("Pending", StyleKind::Pending),
            BuildStatus::Unspecified => ("Unknown", StyleKind::Unknown),
        };
        StatusClass { label, style }
    }

    /// Lenient decode: unknown or empty names map to `Unspecified`
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(BuildStatus::Unspecified)
    }
}

/// Free-function form of [`BuildStatus::is_terminal`]
pub fn is_terminal(status: BuildStatus) -> bool {
    status.is_terminal()
}

/// Free-function form of [`BuildStatus::classify`]
pub fn classify(status: BuildStatus) -> StatusClass {
    status.classify()
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for status names the platform does not define
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown build status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BuildStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unspecified" => Ok(BuildStatus::Unspecified),
            "pending" => Ok(BuildStatus::Pending),
            "building" => Ok(BuildStatus::Building),
            "success" => Ok(BuildStatus::Success),
            "failed" => Ok(BuildStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Serialize for BuildStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BuildStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(BuildStatus::from_wire(&raw))
    }
}

/// How a status should be styled by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Success,
    Failed,
    Building,
    Pending,
    Unknown,
}

impl StyleKind {
    /// CSS-style class name; empty for unknown
    pub fn class_name(&self) -> &'static str {
        match self {
            StyleKind::Success => "status-success",
            StyleKind::Failed => "status-failed",
            StyleKind::Building => "status-building",
            StyleKind::Pending => "status-pending",
            StyleKind::Unknown => "",
        }
    }
}

/// Result of [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusClass {
    pub label: &'static str,
    pub style: StyleKind,
}
