//! Download job types, events and errors.
//!
//! This module contains pure data types for the session manager. No I/O,
//! networking, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - Job identifiers, lifecycle states and status snapshots
//! - `events` - Progress events, job updates and terminal outcomes
//! - `errors` - The error code taxonomy and `ErrorRecord`

pub mod errors;
pub mod events;
pub mod types;

pub use errors::{
    AuthErrorCode, DownloadErrorCode, ErrorCode, ErrorRecord, RemediationAction, UNKNOWN_ERROR,
};
pub use events::{CancelReason, JobOutcome, JobUpdate, JobUpdateStream, ProgressEvent};
pub use types::{JobId, JobState, ProgressSnapshot, SessionStatus};
