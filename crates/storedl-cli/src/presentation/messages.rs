//! User-facing text for job outcomes and error codes.
//!
//! This is the only place error codes become words. Matching is exhaustive so
//! a new code cannot ship without a message.

use storedl_core::{
    AuthErrorCode, BuildVersion, DownloadErrorCode, DownloadMode, ErrorCode, ErrorRecord,
    RemediationAction,
};

/// Help page for accounts that have not claimed the desktop build.
pub const CLAIM_DESKTOP_VERSION_URL: &str =
    "https://github.com/Zagrios/bs-manager/wiki/how-to-claim-oculus-desktop-version";

const UNKNOWN_MESSAGE: &str = "An unexpected error occurred.";

pub const fn auth_message(code: AuthErrorCode) -> &'static str {
    match code {
        AuthErrorCode::LoginWindowClosedByUser => "Login was cancelled.",
        AuthErrorCode::LoginFailed => "Login failed. Check your credentials and try again.",
        AuthErrorCode::SessionExpired => "Your session has expired. Please log in again.",
        AuthErrorCode::LoginUnavailable => "The login service is currently unavailable.",
        AuthErrorCode::SessionUnreadable => "The stored session could not be read or written.",
    }
}

pub const fn download_message(code: DownloadErrorCode) -> &'static str {
    match code {
        DownloadErrorCode::UnableToGetManifest => {
            "Unable to get the file list for this version from the store."
        }
        DownloadErrorCode::ManifestFailed => {
            "The store refused to provide this version. Your account may not own it."
        }
        DownloadErrorCode::Cancelled => "Download cancelled.",
        DownloadErrorCode::AlreadyDownloading => "Another version is already downloading.",
        DownloadErrorCode::NetworkError => "The download was interrupted by a network error.",
        DownloadErrorCode::NotEnoughSpace => "Not enough disk space to complete the download.",
        DownloadErrorCode::WriteFailed => "Downloaded files could not be written to disk.",
        DownloadErrorCode::ChecksumMismatch => {
            "A downloaded file is corrupted (checksum mismatch)."
        }
    }
}

/// Message for any code, including ones this build does not know.
pub const fn code_message(code: &ErrorCode) -> &'static str {
    match code {
        ErrorCode::Auth(code) => auth_message(*code),
        ErrorCode::Download(code) => download_message(*code),
        ErrorCode::Unknown(_) => UNKNOWN_MESSAGE,
    }
}

/// One-line description: message, display code and detail.
pub fn describe(record: &ErrorRecord) -> String {
    let mut text = format!(
        "{} ({})",
        code_message(&record.code),
        record.code.display_code()
    );
    if let Some(detail) = record.detail.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(": ");
        text.push_str(detail);
    }
    text
}

/// Suggested next step for a remediation action.
pub fn remediation_hint(action: RemediationAction) -> String {
    match action {
        RemediationAction::ClaimDesktopVersion => {
            format!("To claim the desktop version of the game, see {CLAIM_DESKTOP_VERSION_URL}")
        }
    }
}

/// Confirmation shown after a successful job. Verification and download read
/// differently.
pub fn success_message(version: &BuildVersion, mode: DownloadMode) -> String {
    match mode {
        DownloadMode::Download => format!("Download of {version} completed successfully."),
        DownloadMode::Verify => format!("Verification of {version} finished."),
    }
}
