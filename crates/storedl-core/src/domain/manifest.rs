//! Provider manifest describing the payload of a version.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::version::{BuildVersion, DownloadMode};

/// Parameters of a manifest lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRequest {
    pub version: BuildVersion,
    pub mode: DownloadMode,
}

impl ManifestRequest {
    #[must_use]
    pub const fn new(version: BuildVersion, mode: DownloadMode) -> Self {
        Self { version, mode }
    }
}

/// One payload file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Path relative to the install directory, `/`-separated.
    pub path: String,
    /// Expected size in bytes.
    pub size: u64,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
    /// Location of the content; may be relative to the provider base URL.
    pub url: String,
}

/// The provider's description of a version's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: BuildVersion,
    pub files: Vec<ManifestFile>,
}

/// Structural problems found in a manifest.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("Manifest lists no files")]
    Empty,

    #[error("Manifest is for version {actual}, expected {expected}")]
    VersionMismatch {
        expected: BuildVersion,
        actual: BuildVersion,
    },

    #[error("Unsafe file path in manifest: {0}")]
    UnsafePath(String),

    #[error("Duplicate file path in manifest: {0}")]
    DuplicatePath(String),

    #[error("Invalid sha256 digest for {path}")]
    InvalidDigest { path: String },
}

impl Manifest {
    /// Sum of all file sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files
            .iter()
            .fold(0u64, |acc, f| acc.saturating_add(f.size))
    }

    /// Check the manifest is usable for `expected`.
    pub fn validate(&self, expected: &BuildVersion) -> Result<(), ManifestError> {
        if &self.version != expected {
            return Err(ManifestError::VersionMismatch {
                expected: expected.clone(),
                actual: self.version.clone(),
            });
        }
        if self.files.is_empty() {
            return Err(ManifestError::Empty);
        }

        let mut seen = HashSet::with_capacity(self.files.len());
        for file in &self.files {
            if !is_safe_relative(&file.path) {
                return Err(ManifestError::UnsafePath(file.path.clone()));
            }
            // `a//b`, `a/./b` and `a/b/` all name the same file on disk.
            let key: PathBuf = Path::new(&file.path).components().collect();
            if !seen.insert(key) {
                return Err(ManifestError::DuplicatePath(file.path.clone()));
            }
            if !is_sha256_hex(&file.sha256) {
                return Err(ManifestError::InvalidDigest {
                    path: file.path.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_safe_relative(path: &str) -> bool {
    if path.is_empty() || path.contains('\\') {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

fn is_sha256_hex(digest: &str) -> bool {
    digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit())
}
