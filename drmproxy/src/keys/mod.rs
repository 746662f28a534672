mod client;
mod error;
mod response;

use async_trait::async_trait;
use drm_cpix::AssetKeyRequest;

pub use client::{CpixKeyService, DEFAULT_UPSTREAM_TIMEOUT};
pub use error::{KeyServiceError, SetupError, UpstreamError};
pub use response::{ContentKeyEntry, ContentKeyResponse, Pssh};

/**
    Source of content key information for an asset.
*/
#[async_trait]
pub trait KeyService: Send + Sync {
    async fn content_key_from(
        &self,
        req: &AssetKeyRequest,
    ) -> Result<ContentKeyResponse, KeyServiceError>;
}
