use url::Url;

use crate::{AcquisitionError, TokenMetadata};

const IPFS_SCHEME: &str = "ipfs://";

pub(crate) fn is_ipfs_locator(locator: &str) -> bool {
    locator.starts_with(IPFS_SCHEME)
}

/// Rewrite an `ipfs://` locator onto the HTTP gateway; other locators pass
/// through. The result must be an absolute URL.
pub(crate) fn resolve_locator(locator: &str, gateway: &str) -> Result<String, AcquisitionError> {
    let resolved = match locator.strip_prefix(IPFS_SCHEME) {
        Some(hash) => format!("{gateway}{hash}"),
        None => locator.to_string(),
    };
    Url::parse(&resolved).map_err(|err| AcquisitionError::InvalidLocator {
        locator: locator.to_string(),
        reason: err.to_string(),
    })?;
    Ok(resolved)
}

/// Copy of `metadata` with an IPFS `image` pointed at the gateway.
pub(crate) fn adjust_image_url(
    metadata: &TokenMetadata,
    gateway: &str,
) -> Result<TokenMetadata, AcquisitionError> {
    let mut adjusted = metadata.clone();
    if let Some(image) = adjusted.image.as_deref() {
        if is_ipfs_locator(image) {
            adjusted.image = Some(resolve_locator(image, gateway)?);
        }
    }
    Ok(adjusted)
}

/// Gateways are joined by plain concatenation, so keep exactly one trailing slash.
pub(crate) fn normalize_gateway(gateway: &str) -> String {
    format!("{}/", gateway.trim().trim_end_matches('/'))
}
