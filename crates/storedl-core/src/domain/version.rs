//! Build version identifiers and download modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a [`BuildVersion`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// The version string was empty or whitespace only.
    #[error("Version cannot be empty")]
    Empty,

    /// The version string cannot be used as a directory name.
    #[error("Invalid version '{value}': {reason}")]
    Invalid {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Identifier of a specific build of the managed application.
///
/// Opaque to the session manager apart from one constraint: the version names
/// the install directory, so it must be a single safe path component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildVersion(String);

impl BuildVersion {
    /// Parse and validate a version string.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }
        if trimmed == "." || trimmed == ".." || trimmed.contains("..") {
            return Err(VersionError::Invalid {
                value: raw.to_string(),
                reason: "must not contain '..'",
            });
        }
        if trimmed.contains(['/', '\\']) {
            return Err(VersionError::Invalid {
                value: raw.to_string(),
                reason: "must not contain path separators",
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(VersionError::Invalid {
                value: raw.to_string(),
                reason: "must not contain control characters",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BuildVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BuildVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuildVersion> for String {
    fn from(version: BuildVersion) -> Self {
        version.0
    }
}

/// Intent of a job: fetch a fresh copy or check an installed one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMode {
    /// Download the full payload.
    #[default]
    Download,
    /// Validate the installed payload and replace the parts that fail.
    Verify,
}

impl DownloadMode {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Verify => "verify",
        }
    }

    #[must_use]
    pub const fn is_verify(self) -> bool {
        matches!(self, Self::Verify)
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
