//! File-backed credential store.
//!
//! The session is kept as a small JSON record at a well-known path
//! (`<data_root>/session/provider-session.json` by default). Writes go to a
//! temporary file in the same directory which is then renamed over the
//! record, so a crash never leaves a half-written session behind.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storedl_core::{CredentialError, CredentialStorePort, PathError, SessionToken};

/// On-disk shape of the session record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: SessionToken,
    saved_at: DateTime<Utc>,
}

/// Credential store persisting the session token to a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location.
    pub fn at_default_location() -> Result<Self, PathError> {
        Ok(Self::new(storedl_core::credential_path()?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the stored session was written, if one is stored.
    pub fn saved_at(&self) -> Result<DateTime<Utc>, CredentialError> {
        self.read_record().map(|record| record.saved_at)
    }

    fn read_record(&self) -> Result<StoredSession, CredentialError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(CredentialError::NotFound),
            Err(e) => return Err(CredentialError::from_io_error(&e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| CredentialError::Corrupt(e.to_string()))
    }

    fn write_record(&self, record: &StoredSession) -> Result<(), CredentialError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| CredentialError::from_io_error(&e))?;

        let body =
            serde_json::to_vec_pretty(record).map_err(|e| CredentialError::Corrupt(e.to_string()))?;

        // NamedTempFile is created with mode 0600 on unix.
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| CredentialError::from_io_error(&e))?;
        tmp.write_all(&body)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CredentialError::from_io_error(&e))?;
        tmp.persist(&self.path)
            .map_err(|e| CredentialError::from_io_error(&e.error))?;
        Ok(())
    }
}

impl CredentialStorePort for FileCredentialStore {
    fn exists(&self) -> bool {
        self.read_record().is_ok()
    }

    fn load(&self) -> Result<SessionToken, CredentialError> {
        self.read_record().map(|record| record.token)
    }

    fn save(&self, token: &SessionToken) -> Result<(), CredentialError> {
        let record = StoredSession {
            token: token.clone(),
            saved_at: Utc::now(),
        };
        self.write_record(&record)?;
        tracing::info!(
            target: "storedl.credentials",
            path = %self.path.display(),
            "session saved"
        );
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(
                    target: "storedl.credentials",
                    path = %self.path.display(),
                    "session deleted"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialError::from_io_error(&e)),
        }
    }
}
