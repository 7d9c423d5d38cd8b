//! Domain values shared by every storedl component.

mod manifest;
mod token;
mod version;

pub use manifest::{Manifest, ManifestError, ManifestFile, ManifestRequest};
pub use token::{SessionToken, TokenError};
pub use version::{BuildVersion, DownloadMode, VersionError};
