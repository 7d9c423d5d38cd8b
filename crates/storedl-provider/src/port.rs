//! Port trait implementation for `ProviderClient`.
//!
//! Converts between wire types and core DTOs, and maps HTTP failures onto
//! `ProviderError`.

use async_trait::async_trait;
use storedl_core::{
    Manifest, ManifestFile, ManifestRequest, PayloadStream, ProviderClientPort, ProviderError,
    SessionToken, ports::ProviderResult,
};

use crate::client::ProviderClient;
use crate::endpoints::{build_manifest_url, build_payload_url, is_provider_origin};
use crate::error::ProviderHttpError;
use crate::http::HttpBackend;
use crate::models::WireManifest;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `ProviderHttpError` to core `ProviderError`.
fn map_error(err: ProviderHttpError) -> ProviderError {
    match err {
        ProviderHttpError::ApiRequestFailed { status, url } => match status {
            401 => ProviderError::Unauthorized,
            403 => ProviderError::AccessDenied(url),
            404 => ProviderError::NotFound(url),
            _ => ProviderError::Http {
                status,
                message: url,
            },
        },
        ProviderHttpError::Network(e) if e.is_decode() || e.is_body() => {
            ProviderError::Malformed(e.to_string())
        }
        ProviderHttpError::Network(e) => ProviderError::Unreachable(e.to_string()),
        ProviderHttpError::InvalidBaseUrl(url) => ProviderError::Unreachable(url),
        ProviderHttpError::InvalidResponse { message } => ProviderError::Malformed(message),
        ProviderHttpError::InvalidUrl(e) => ProviderError::Malformed(e.to_string()),
        ProviderHttpError::JsonParse(e) => ProviderError::Malformed(e.to_string()),
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> ProviderClientPort for ProviderClient<B> {
    async fn fetch_manifest(
        &self,
        token: &SessionToken,
        request: &ManifestRequest,
    ) -> ProviderResult<Manifest> {
        let url = build_manifest_url(&self.config, request).map_err(map_error)?;
        tracing::debug!(
            target: "storedl.provider",
            version = %request.version,
            mode = %request.mode,
            "fetching manifest"
        );

        let wire: WireManifest = self
            .backend
            .get_json(&url, token.expose())
            .await
            .map_err(map_error)?;
        let manifest = wire.into_manifest().map_err(map_error)?;

        tracing::debug!(
            target: "storedl.provider",
            version = %manifest.version,
            files = manifest.files.len(),
            total_bytes = manifest.total_size(),
            "manifest received"
        );
        Ok(manifest)
    }

    async fn open_payload(
        &self,
        token: &SessionToken,
        file: &ManifestFile,
    ) -> ProviderResult<PayloadStream> {
        let url = build_payload_url(&self.config, file).map_err(map_error)?;
        let bearer = is_provider_origin(&self.config, &url).then(|| token.expose());
        if bearer.is_none() {
            tracing::debug!(
                target: "storedl.provider",
                host = url.host_str().unwrap_or_default(),
                "payload on a foreign host, sending it without the session token"
            );
        }
        tracing::trace!(target: "storedl.provider", path = %file.path, "opening payload");
        self.backend
            .get_stream(&url, bearer)
            .await
            .map_err(map_error)
    }
}
