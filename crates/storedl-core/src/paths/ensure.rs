//! Directory creation.

use std::fs;
use std::path::Path;

use super::error::PathError;

/// Create `path` and its parents if missing; error if it exists as a file.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|source| PathError::CreateFailed {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(target: "storedl.paths", path = %path.display(), "created directory");
    Ok(())
}
