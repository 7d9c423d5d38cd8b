//! Content provider client port trait.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;

use super::error::ProviderResult;
use crate::domain::{Manifest, ManifestFile, ManifestRequest, SessionToken};

/// Body of one payload file, in network-sized chunks.
pub type PayloadStream = Pin<Box<dyn Stream<Item = ProviderResult<Bytes>> + Send>>;

/// Port trait for the content provider.
///
/// # Design
///
/// - Uses core-owned DTOs, not wire types
/// - Returns `ProviderError` for all failures
/// - The token is passed per call; the client holds no session state
#[async_trait]
pub trait ProviderClientPort: Send + Sync {
    /// Fetch the manifest for a version. The result is not validated.
    async fn fetch_manifest(
        &self,
        token: &SessionToken,
        request: &ManifestRequest,
    ) -> ProviderResult<Manifest>;

    /// Open the content stream of one manifest file.
    async fn open_payload(
        &self,
        token: &SessionToken,
        file: &ManifestFile,
    ) -> ProviderResult<PayloadStream>;
}
