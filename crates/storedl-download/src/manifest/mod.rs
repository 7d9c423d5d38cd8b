//! Manifest resolution.
//!
//! Fetches the provider's file list for a version and checks it before any
//! byte is written.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use storedl_core::{
    AuthErrorCode, DownloadErrorCode, ErrorRecord, Manifest, ManifestRequest, ProviderClientPort,
    ProviderError, SessionToken,
};

/// Resolves and validates manifests through the provider port.
pub struct ManifestResolver {
    provider: Arc<dyn ProviderClientPort>,
}

impl ManifestResolver {
    pub fn new(provider: Arc<dyn ProviderClientPort>) -> Self {
        Self { provider }
    }

    /// Fetch the manifest for `request`. Errors are already normalized.
    pub async fn resolve(
        &self,
        token: &SessionToken,
        request: &ManifestRequest,
        cancel: &CancellationToken,
    ) -> Result<Manifest, ErrorRecord> {
        tracing::debug!(
            target: "storedl.session",
            version = %request.version,
            mode = request.mode.as_str(),
            "resolving manifest"
        );

        let fetched = tokio::select! {
            biased;

            () = cancel.cancelled() => return Err(ErrorRecord::cancelled()),

            fetched = self.provider.fetch_manifest(token, request) => fetched,
        };

        let manifest = fetched.map_err(map_manifest_error)?;

        if let Err(e) = manifest.validate(&request.version) {
            tracing::warn!(
                target: "storedl.session",
                version = %request.version,
                error = %e,
                "provider returned an invalid manifest"
            );
            return Err(ErrorRecord::with_detail(
                DownloadErrorCode::UnableToGetManifest,
                e.to_string(),
            ));
        }

        tracing::info!(
            target: "storedl.session",
            version = %request.version,
            files = manifest.files.len(),
            bytes = manifest.total_size(),
            "manifest resolved"
        );
        Ok(manifest)
    }
}

/// Normalize a provider failure seen while fetching a manifest.
fn map_manifest_error(err: ProviderError) -> ErrorRecord {
    match err {
        ProviderError::AccessDenied(detail) => {
            ErrorRecord::with_detail(DownloadErrorCode::ManifestFailed, detail)
        }
        ProviderError::Unauthorized => ErrorRecord::new(AuthErrorCode::SessionExpired),
        other => ErrorRecord::with_detail(DownloadErrorCode::UnableToGetManifest, other.to_string()),
    }
}
