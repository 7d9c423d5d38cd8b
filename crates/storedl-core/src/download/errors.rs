//! Download error taxonomy.
//!
//! Every failure a job can end with is normalized into an [`ErrorRecord`]
//! carrying a stable string code. The code sets are closed enums so the
//! presentation layer can match exhaustively; codes that arrive from outside
//! these sets are preserved as [`ErrorCode::Unknown`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::domain::BuildVersion;

/// Authentication failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    /// The user dismissed the interactive login. Soft cancel.
    LoginWindowClosedByUser,
    /// The provider rejected the login or returned an unusable token.
    LoginFailed,
    /// The provider rejected a previously valid token.
    SessionExpired,
    /// No interactive login surface could be shown.
    LoginUnavailable,
    /// The stored session could not be read or written.
    SessionUnreadable,
}

impl AuthErrorCode {
    pub const ALL: [Self; 5] = [
        Self::LoginWindowClosedByUser,
        Self::LoginFailed,
        Self::SessionExpired,
        Self::LoginUnavailable,
        Self::SessionUnreadable,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoginWindowClosedByUser => "META_LOGIN_WINDOW_CLOSED_BY_USER",
            Self::LoginFailed => "META_LOGIN_FAILED",
            Self::SessionExpired => "META_SESSION_EXPIRED",
            Self::LoginUnavailable => "META_LOGIN_UNAVAILABLE",
            Self::SessionUnreadable => "META_SESSION_UNREADABLE",
        }
    }

    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

/// Manifest, transfer and job-control failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DownloadErrorCode {
    /// The manifest could not be fetched or was unusable.
    UnableToGetManifest,
    /// The provider refused the manifest, usually an entitlement problem.
    ManifestFailed,
    /// The job was stopped by the caller. Soft cancel.
    Cancelled,
    /// Another job is active on this manager.
    AlreadyDownloading,
    /// The payload stream failed.
    NetworkError,
    /// The target volume ran out of space.
    NotEnoughSpace,
    /// Writing the payload to local storage failed.
    WriteFailed,
    /// Payload contents did not match the manifest.
    ChecksumMismatch,
}

impl DownloadErrorCode {
    pub const ALL: [Self; 8] = [
        Self::UnableToGetManifest,
        Self::ManifestFailed,
        Self::Cancelled,
        Self::AlreadyDownloading,
        Self::NetworkError,
        Self::NotEnoughSpace,
        Self::WriteFailed,
        Self::ChecksumMismatch,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnableToGetManifest => "UNABLE_TO_GET_MANIFEST",
            Self::ManifestFailed => "DOWNLOAD_MANIFEST_FAILED",
            Self::Cancelled => "DOWNLOAD_CANCELLED",
            Self::AlreadyDownloading => "ALREADY_DOWNLOADING",
            Self::NetworkError => "NETWORK_ERROR",
            Self::NotEnoughSpace => "NOT_ENOUGH_SPACE",
            Self::WriteFailed => "WRITE_FAILED",
            Self::ChecksumMismatch => "CHECKSUM_MISMATCH",
        }
    }

    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

/// Code shown for anything outside the known sets.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// A stable error code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Auth(AuthErrorCode),
    Download(DownloadErrorCode),
    /// A code outside the known sets, kept verbatim.
    Unknown(String),
}

impl ErrorCode {
    /// Parse a wire code. Never fails; unrecognized codes become `Unknown`.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        if let Some(auth) = AuthErrorCode::parse(code) {
            return Self::Auth(auth);
        }
        if let Some(download) = DownloadErrorCode::parse(code) {
            return Self::Download(download);
        }
        Self::Unknown(code.to_string())
    }

    /// The code as carried on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auth(code) => code.as_str(),
            Self::Download(code) => code.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    /// The code used to pick user-facing text; `UNKNOWN_ERROR` for unknown codes.
    #[must_use]
    pub fn display_code(&self) -> &str {
        match self {
            Self::Unknown(_) => UNKNOWN_ERROR,
            known => known.as_str(),
        }
    }

    /// Designed cancellation outcomes that are never surfaced as errors.
    #[must_use]
    pub const fn is_soft_cancel(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthErrorCode::LoginWindowClosedByUser)
                | Self::Download(DownloadErrorCode::Cancelled)
        )
    }

    #[must_use]
    pub const fn remediation(&self) -> Option<RemediationAction> {
        match self {
            Self::Download(
                DownloadErrorCode::ManifestFailed | DownloadErrorCode::UnableToGetManifest,
            ) => Some(RemediationAction::ClaimDesktopVersion),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AuthErrorCode> for ErrorCode {
    fn from(code: AuthErrorCode) -> Self {
        Self::Auth(code)
    }
}

impl From<DownloadErrorCode> for ErrorCode {
    fn from(code: DownloadErrorCode) -> Self {
        Self::Download(code)
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Follow-up action a presenter can offer next to an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemediationAction {
    /// The account must claim the desktop edition before it can download.
    ClaimDesktopVersion,
}

impl RemediationAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClaimDesktopVersion => "claim-your-desktop-version",
        }
    }
}

/// A normalized failure: stable code plus optional diagnostic detail.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}{}", detail_suffix(.detail.as_deref()))]
pub struct ErrorRecord {
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(": {d}")).unwrap_or_default()
}

impl ErrorRecord {
    pub fn new(code: impl Into<ErrorCode>) -> Self {
        Self {
            code: code.into(),
            detail: None,
        }
    }

    pub fn with_detail(code: impl Into<ErrorCode>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: Some(detail.into()),
        }
    }

    /// Rejection of a second start while `active` is downloading.
    #[must_use]
    pub fn busy(active: &BuildVersion) -> Self {
        Self::with_detail(
            DownloadErrorCode::AlreadyDownloading,
            format!("version {active} is already downloading"),
        )
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(DownloadErrorCode::Cancelled)
    }

    #[must_use]
    pub fn login_closed() -> Self {
        Self::new(AuthErrorCode::LoginWindowClosedByUser)
    }

    /// Map a local storage failure. Full volumes get their own code.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::StorageFull => DownloadErrorCode::NotEnoughSpace,
            _ => DownloadErrorCode::WriteFailed,
        };
        Self::with_detail(code, err.to_string())
    }

    #[must_use]
    pub const fn is_soft_cancel(&self) -> bool {
        self.code.is_soft_cancel()
    }

    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self.code, ErrorCode::Auth(AuthErrorCode::SessionExpired))
    }

    #[must_use]
    pub const fn remediation(&self) -> Option<RemediationAction> {
        self.code.remediation()
    }
}
