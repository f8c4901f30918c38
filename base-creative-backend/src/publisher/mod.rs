//! Content-addressed storage backends
//!

use async_trait::async_trait;
use base_creative_shared::artifact::NamedBlob;
use base_creative_shared::cid::ContentId;
use base_creative_shared::metadata::ArtifactMetadata;
use serde::Deserialize;

use crate::error::PublishError;

pub mod memory;
pub mod pinata;
pub mod web3storage;

pub use memory::MemoryBackend;
pub use pinata::PinataBackend;
pub use web3storage::Web3StorageBackend;

/// Durably persists blobs and returns the CID naming them.
///
/// Every call is a single attempt; failures are returned as-is.
#[async_trait]
pub trait PublisherBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fails with [`PublishError::MissingCredentials`] before any network call is made
    fn ensure_configured(&self) -> Result<(), PublishError>;

    async fn upload_image(
        &self,
        blob: &NamedBlob,
        display_name: &str,
    ) -> Result<ContentId, PublishError>;

    /// Only called once the image referenced by `metadata.image` has been published
    async fn upload_metadata(&self, metadata: &ArtifactMetadata)
        -> Result<ContentId, PublishError>;

    /// URI placed in the metadata's `image` field
    fn image_ref(&self, cid: &ContentId, blob: &NamedBlob) -> String;
}

/// Send a prepared request and decode the JSON body of a success response
pub(crate) async fn send_json<T: for<'de> Deserialize<'de>>(
    backend: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, PublishError> {
    let response = request
        .send()
        .await
        .map_err(|source| PublishError::Request { backend, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PublishError::Status {
            backend,
            status,
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|err| PublishError::InvalidResponse {
            backend,
            message: err.to_string(),
        })
}
