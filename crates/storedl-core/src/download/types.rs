//! Job identifiers, lifecycle states and the published status snapshot.
//!
//! Pure data types with no I/O dependencies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{BuildVersion, DownloadMode};

/// Identifier of a job within one manager instance. Monotonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle of a job. Terminal states fall back to `Idle` once reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    /// Waiting on a stored token or the interactive login.
    AwaitingAuth,
    /// Fetching the manifest.
    Resolving,
    /// Moving payload bytes.
    Transferring,
    Succeeded,
    Cancelled,
    Failed,
}

impl JobState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingAuth => "awaiting_auth",
            Self::Resolving => "resolving",
            Self::Transferring => "transferring",
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Cancelled | Self::Failed)
    }

    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether a job currently occupies the manager.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_idle() && !self.is_terminal()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes transferred so far for the active job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current: u64,
    pub total: u64,
}

impl ProgressSnapshot {
    #[must_use]
    pub const fn new(current: u64, total: u64) -> Self {
        Self { current, total }
    }
}

/// Snapshot published on the manager's status channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<BuildVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DownloadMode>,
    pub state: JobState,
    pub progress: ProgressSnapshot,
}

impl SessionStatus {
    /// Status of a manager with no job.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Status of a freshly accepted job.
    #[must_use]
    pub const fn started(job: JobId, version: BuildVersion, mode: DownloadMode) -> Self {
        Self {
            job: Some(job),
            version: Some(version),
            mode: Some(mode),
            state: JobState::AwaitingAuth,
            progress: ProgressSnapshot::new(0, 0),
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.state.is_active()
    }

    /// The version being worked on, if a job is active.
    #[must_use]
    pub fn active_version(&self) -> Option<&BuildVersion> {
        if self.is_busy() {
            self.version.as_ref()
        } else {
            None
        }
    }
}
