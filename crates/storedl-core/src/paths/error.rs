//! Path resolution errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve or prepare one of the storedl directories.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot expand `~`: no home directory for this user")]
    NoHomeDir,

    /// The platform reports no local data directory and `STOREDL_DATA_DIR`
    /// is unset.
    #[error("No local data directory found; set STOREDL_DATA_DIR")]
    NoDataDir,

    #[error("{0} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("Cannot create {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path override was given but blank.
    #[error("Path override is empty")]
    EmptyPath,

    /// A relative override could not be anchored.
    #[error("Cannot resolve relative path against the working directory")]
    NoCurrentDir(#[source] io::Error),
}
