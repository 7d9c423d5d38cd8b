//! Location of the persisted provider session.

use std::path::PathBuf;

use super::error::PathError;
use super::platform::data_root;

/// File name of the session record inside `<data_root>/session`.
pub const CREDENTIAL_FILE_NAME: &str = "provider-session.json";

/// Well-known path of the persisted session record.
pub fn credential_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("session").join(CREDENTIAL_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn credential_path_lives_under_data_root() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set("STOREDL_DATA_DIR", "/tmp/storedl-cred");
        let path = credential_path().unwrap();
        assert_eq!(
            path,
            PathBuf::from("/tmp/storedl-cred/session/provider-session.json")
        );
    }
}
