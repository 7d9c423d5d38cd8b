//! URL construction for provider API calls.

use storedl_core::{ManifestFile, ManifestRequest};
use url::Url;

use crate::error::{ProviderHttpError, ProviderHttpResult};
use crate::models::ProviderConfig;

/// `{base}/versions/{version}/manifest?mode=...`
pub fn build_manifest_url(
    config: &ProviderConfig,
    request: &ManifestRequest,
) -> ProviderHttpResult<Url> {
    let mut url = config.base_url.clone();
    url.path_segments_mut()
        .map_err(|()| ProviderHttpError::InvalidBaseUrl(config.base_url.to_string()))?
        .pop_if_empty()
        .extend(["versions", request.version.as_str(), "manifest"]);
    url.query_pairs_mut()
        .append_pair("mode", request.mode.as_str());
    Ok(url)
}

/// Location of a payload file. Absolute URLs are used as-is.
pub fn build_payload_url(config: &ProviderConfig, file: &ManifestFile) -> ProviderHttpResult<Url> {
    match Url::parse(&file.url) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(config.base_url.join(&file.url)?),
        Err(e) => Err(e.into()),
    }
}

/// Whether `url` is served by the provider itself. Only those requests carry
/// the session token.
pub fn is_provider_origin(config: &ProviderConfig, url: &Url) -> bool {
    url.origin() == config.base_url.origin()
}
