//! Core domain for storedl.
//!
//! Pure data types, the download error taxonomy, job events and the port
//! traits that infrastructure crates implement. Nothing in here performs
//! network I/O; the only filesystem access is path resolution.
//!
//! - `domain` - versions, session tokens, manifests
//! - `download` - error taxonomy, job states, progress events and outcomes
//! - `ports` - credential store, login surface, provider client, session manager
//! - `paths` - data root, credential file and install root resolution

pub mod domain;
pub mod download;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    BuildVersion, DownloadMode, Manifest, ManifestError, ManifestFile, ManifestRequest,
    SessionToken, TokenError, VersionError,
};
pub use download::{
    AuthErrorCode, CancelReason, DownloadErrorCode, ErrorCode, ErrorRecord, JobId, JobOutcome,
    JobState, JobUpdate, JobUpdateStream, ProgressEvent, ProgressSnapshot, RemediationAction,
    SessionStatus,
};
pub use ports::{
    CredentialError, CredentialStorePort, LoginOutcome, LoginSurfacePort, PayloadStream,
    ProviderClientPort, ProviderError, ProviderResult, SessionError, SessionManagerConfig,
    SessionManagerPort,
};

// Re-export path utilities
pub use paths::{
    InstallRootResolution, InstallRootSource, PathError, ResolvedPaths, credential_path,
    data_root, default_install_root, ensure_directory, resolve_install_root,
};
