//! Install root resolution.
//!
//! Each version is installed into `<install_root>/<version>`.

use std::env;
use std::path::PathBuf;

use super::error::PathError;
use super::platform::{data_root, normalize_user_path};

/// Directory under the data root used when nothing else is configured.
pub const DEFAULT_INSTALL_DIR_NAME: &str = "versions";

const INSTALL_DIR_ENV: &str = "STOREDL_INSTALL_DIR";

/// How the install root was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallRootSource {
    /// The user passed an explicit path (e.g., `--install-dir`).
    Explicit,
    /// The path came from environment variables / `.env`.
    EnvVar,
    /// Fallback default (`<data_root>/versions`).
    Default,
}

/// Resolution result for the install root.
#[derive(Debug, Clone)]
pub struct InstallRootResolution {
    pub path: PathBuf,
    pub source: InstallRootSource,
}

/// Default install root, `<data_root>/versions`.
pub fn default_install_root() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(DEFAULT_INSTALL_DIR_NAME))
}

/// Resolve the install root from an explicit override, env var, or default.
///
/// Resolution order:
/// 1. Explicit path provided by caller (highest priority)
/// 2. `STOREDL_INSTALL_DIR` environment variable
/// 3. Default install root
pub fn resolve_install_root(explicit: Option<&str>) -> Result<InstallRootResolution, PathError> {
    if let Some(path_str) = explicit {
        return Ok(InstallRootResolution {
            path: normalize_user_path(path_str)?,
            source: InstallRootSource::Explicit,
        });
    }

    if let Ok(env_path) = env::var(INSTALL_DIR_ENV) {
        if !env_path.trim().is_empty() {
            return Ok(InstallRootResolution {
                path: normalize_user_path(&env_path)?,
                source: InstallRootSource::EnvVar,
            });
        }
    }

    Ok(InstallRootResolution {
        path: default_install_root()?,
        source: InstallRootSource::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn explicit_wins_over_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(INSTALL_DIR_ENV, "/tmp/from-env");
        let resolved = resolve_install_root(Some("/tmp/explicit")).unwrap();
        assert_eq!(resolved.source, InstallRootSource::Explicit);
        assert!(resolved.path.ends_with("explicit"));
    }

    #[test]
    fn env_value_is_used() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(INSTALL_DIR_ENV, "/tmp/from-env");
        let resolved = resolve_install_root(None).unwrap();
        assert_eq!(resolved.source, InstallRootSource::EnvVar);
        assert!(resolved.path.ends_with("from-env"));
    }

    #[test]
    fn default_is_under_data_root() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _data = EnvVarGuard::set("STOREDL_DATA_DIR", "/tmp/storedl-root");
        let _env = EnvVarGuard::set(INSTALL_DIR_ENV, "");
        let resolved = resolve_install_root(None).unwrap();
        assert_eq!(resolved.source, InstallRootSource::Default);
        assert_eq!(resolved.path, PathBuf::from("/tmp/storedl-root/versions"));
    }
}
