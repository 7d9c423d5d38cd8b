//! Download session manager for storedl.
//!
//! Implements `SessionManagerPort` on top of the provider, credential and
//! login ports defined in `storedl-core`.
//!
//! # Modules
//!
//! - `credentials` - File-backed credential store
//! - `auth` - Stored-session reuse and interactive login
//! - `manifest` - Manifest fetch and validation
//! - `transfer` - Staged payload transfer with atomic commit
//! - `session` - The manager: single-job slot, status channel, update streams

#![cfg_attr(not(test), deny(unused_crate_dependencies))]

// Re-export core types for convenience
pub use storedl_core::{
    BuildVersion, DownloadMode, ErrorRecord, JobOutcome, JobUpdate, JobUpdateStream,
    SessionError, SessionManagerConfig, SessionManagerPort, SessionStatus,
};

pub(crate) mod auth;
pub(crate) mod manifest;
pub(crate) mod progress;
pub(crate) mod transfer;

mod credentials;
mod session;

pub use credentials::FileCredentialStore;
pub use progress::ProgressThrottle;
pub use session::{SessionManager, SessionManagerDeps, build_session_manager};
pub use transfer::InstallLayout;
