//! Pure path resolver for testing and CLI introspection.
//!
//! Captures all resolved paths in one call for the `storedl paths` command.

use std::path::PathBuf;

use super::{InstallRootSource, PathError, credential_path, data_root, resolve_install_root};

/// All resolved paths captured in a single struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Root directory for application data
    pub data_root: PathBuf,
    /// Path to the persisted provider session
    pub credential_path: PathBuf,
    /// Directory holding one subdirectory per installed version
    pub install_root: PathBuf,
    /// How the install root was resolved
    pub install_source: InstallRootSource,
}

impl ResolvedPaths {
    /// Resolve all paths using the current environment.
    pub fn resolve() -> Result<Self, PathError> {
        Self::resolve_with_install_root(None)
    }

    /// Resolve with an explicit install root override (`--install-dir`).
    pub fn resolve_with_install_root(install_root: Option<&str>) -> Result<Self, PathError> {
        let install = resolve_install_root(install_root)?;
        Ok(Self {
            data_root: data_root()?,
            credential_path: credential_path()?,
            install_root: install.path,
            install_source: install.source,
        })
    }
}

impl std::fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "data_root = {}", self.data_root.display())?;
        writeln!(f, "credential_path = {}", self.credential_path.display())?;
        writeln!(f, "install_root = {}", self.install_root.display())?;
        write!(f, "install_source = {:?}", self.install_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn resolve_returns_consistent_paths() {
        let _guard = ENV_LOCK.lock().unwrap();

        let first = ResolvedPaths::resolve().expect("first resolve");
        let second = ResolvedPaths::resolve().expect("second resolve");

        assert_eq!(first, second, "path resolution should be deterministic");
    }

    #[test]
    fn display_format_is_parseable() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set("STOREDL_DATA_DIR", "/tmp/storedl-display");
        let paths = ResolvedPaths::resolve_with_install_root(Some("/tmp/installs")).unwrap();
        let output = paths.to_string();

        assert!(output.contains("data_root = /tmp/storedl-display"));
        assert!(output.contains("credential_path = "));
        assert!(output.contains("install_root = /tmp/installs"));
        assert!(output.contains("install_source = Explicit"));
    }
}
