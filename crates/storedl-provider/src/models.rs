//! Internal wire types for the provider API.
//!
//! External consumers use the domain types from `storedl-core`.

use serde::Deserialize;
use storedl_core::{BuildVersion, Manifest, ManifestFile};
use url::Url;

use crate::error::{ProviderHttpError, ProviderHttpResult};

// ============================================================================
// Configuration (used internally, see config.rs for public config)
// ============================================================================

/// Internal configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API root, always ending in `/` so relative URLs join beneath it
    pub base_url: Url,
    pub max_retries: u8,
    pub retry_base_delay_ms: u64,
}

impl ProviderConfig {
    pub fn new(base_url: &str, max_retries: u8, retry_base_delay_ms: u64) -> ProviderHttpResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderHttpError::InvalidBaseUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            max_retries,
            retry_base_delay_ms,
        })
    }
}

// ============================================================================
// Manifest
// ============================================================================

/// Manifest body as served by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct WireManifest {
    pub version: String,
    pub files: Vec<WireFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFile {
    pub path: String,
    pub size: u64,
    pub sha256: String,
    pub url: String,
}

impl WireManifest {
    /// Convert to the domain manifest. Structural validation is left to the
    /// caller; only the version must parse here.
    pub fn into_manifest(self) -> ProviderHttpResult<Manifest> {
        let version =
            BuildVersion::parse(&self.version).map_err(|e| ProviderHttpError::InvalidResponse {
                message: format!("manifest version: {e}"),
            })?;
        let files = self
            .files
            .into_iter()
            .map(|f| ManifestFile {
                path: f.path,
                size: f.size,
                sha256: f.sha256.to_ascii_lowercase(),
                url: f.url,
            })
            .collect();
        Ok(Manifest { version, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ProviderConfig::new("https://store.example.net/api", 3, 500).unwrap();
        assert_eq!(config.base_url.as_str(), "https://store.example.net/api/");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            ProviderConfig::new("mailto:someone@example.net", 3, 500),
            Err(ProviderHttpError::InvalidBaseUrl(_))
        ));
        assert!(ProviderConfig::new("not a url", 3, 500).is_err());
    }

    #[test]
    fn test_wire_manifest_conversion() {
        let wire: WireManifest = serde_json::from_value(json!({
            "version": "1.29.1",
            "files": [{
                "path": "Beat Saber.exe",
                "size": 12,
                "sha256": "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855",
                "url": "blobs/abc"
            }]
        }))
        .unwrap();

        let manifest = wire.into_manifest().unwrap();
        assert_eq!(manifest.version.as_str(), "1.29.1");
        assert_eq!(manifest.files.len(), 1);
        assert!(manifest.files[0].sha256.starts_with("e3b0"));
    }

    #[test]
    fn test_wire_manifest_bad_version() {
        let wire = WireManifest {
            version: String::new(),
            files: vec![],
        };
        assert!(matches!(
            wire.into_manifest(),
            Err(ProviderHttpError::InvalidResponse { .. })
        ));
    }
}
