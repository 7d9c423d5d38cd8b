//! Updates delivered on a job's stream and its terminal outcome.

use std::pin::Pin;

use futures_core::Stream;
use serde::{Deserialize, Serialize};

use super::errors::ErrorRecord;
use crate::domain::{BuildVersion, DownloadMode};

/// Byte-level progress of a job. `version` is the payload of the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub current: u64,
    pub total: u64,
    pub version: BuildVersion,
}

impl ProgressEvent {
    #[must_use]
    pub const fn new(current: u64, total: u64, version: BuildVersion) -> Self {
        Self {
            current,
            total,
            version,
        }
    }

    /// Completion in percent, `None` while the total is unknown.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.current as f64 / self.total as f64 * 100.0).min(100.0))
    }
}

/// Why a job ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The user dismissed the interactive login.
    LoginClosed,
    /// The caller invoked stop.
    DownloadStopped,
}

impl CancelReason {
    #[must_use]
    pub fn into_record(self) -> ErrorRecord {
        match self {
            Self::LoginClosed => ErrorRecord::login_closed(),
            Self::DownloadStopped => ErrorRecord::cancelled(),
        }
    }
}

/// Terminal result of a job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded {
        version: BuildVersion,
        mode: DownloadMode,
    },
    Cancelled { reason: CancelReason },
    Failed { error: ErrorRecord },
}

impl JobOutcome {
    /// Classify a pipeline error. Soft-cancel codes become `Cancelled`.
    #[must_use]
    pub fn from_error(error: ErrorRecord) -> Self {
        if error.code == ErrorRecord::login_closed().code {
            Self::Cancelled {
                reason: CancelReason::LoginClosed,
            }
        } else if error.code == ErrorRecord::cancelled().code {
            Self::Cancelled {
                reason: CancelReason::DownloadStopped,
            }
        } else {
            Self::Failed { error }
        }
    }

    /// Collapse into a plain result. Soft cancels surface as their codes.
    pub fn into_result(self) -> Result<BuildVersion, ErrorRecord> {
        match self {
            Self::Succeeded { version, .. } => Ok(version),
            Self::Cancelled { reason } => Err(reason.into_record()),
            Self::Failed { error } => Err(error),
        }
    }

    /// The error to notify the user about. Soft cancels never notify.
    #[must_use]
    pub const fn notification(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// One item of a job's update stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobUpdate {
    Progress(ProgressEvent),
    Finished(JobOutcome),
}

/// Lazily driven sequence of updates: progress zero or more times, then
/// exactly one `Finished`.
pub type JobUpdateStream = Pin<Box<dyn Stream<Item = JobUpdate> + Send>>;
