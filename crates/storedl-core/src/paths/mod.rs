//! Path utilities for storedl data directories and user-configurable locations.
//!
//! This module provides the canonical path resolution for all storedl components:
//! - Application data root
//! - Persisted provider session
//! - Install root for downloaded versions
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific logic is kept private in `platform`

mod ensure;
mod error;
mod install;
mod platform;
mod resolver;
mod session;

#[cfg(test)]
mod test_utils;

// Error type
pub use error::PathError;

// Platform roots
pub use platform::data_root;

// Persisted session
pub use session::{CREDENTIAL_FILE_NAME, credential_path};

// Install root
pub use install::{
    DEFAULT_INSTALL_DIR_NAME, InstallRootResolution, InstallRootSource, default_install_root,
    resolve_install_root,
};

// Directory operations
pub use ensure::ensure_directory;

// Pure resolver for testing and CLI
pub use resolver::ResolvedPaths;
