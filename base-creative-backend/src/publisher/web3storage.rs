//! web3.storage upload API
//!

use async_trait::async_trait;
use base_creative_shared::artifact::NamedBlob;
use base_creative_shared::cid::ContentId;
use base_creative_shared::metadata::ArtifactMetadata;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{send_json, PublisherBackend};
use crate::error::PublishError;

pub const DEFAULT_WEB3_STORAGE_ENDPOINT: &str = "https://api.web3.storage";
pub const DEFAULT_GATEWAY_HOST: &str = "dweb.link";
const BACKEND: &str = "web3.storage";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

/// Sends blobs straight to the storage network with a bearer token.
///
/// A single file is uploaded unwrapped, so the returned CID names the file
/// itself rather than a directory containing it.
pub struct Web3StorageBackend {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    gateway_host: String,
}

impl Web3StorageBackend {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        token: Option<String>,
        gateway_host: &str,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.filter(|v| !v.is_empty()),
            gateway_host: gateway_host.to_string(),
        }
    }

    fn token(&self) -> Result<&str, PublishError> {
        self.token.as_deref().ok_or_else(|| {
            PublishError::MissingCredentials("WEB3_STORAGE_TOKEN must be set".to_string())
        })
    }

    async fn put(&self, blob: &NamedBlob) -> Result<ContentId, PublishError> {
        let token = self.token()?;
        let request = self
            .client
            .post(format!("{}/upload", self.endpoint))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, blob.mime_type.as_str())
            .header("X-Name", blob.filename.as_str())
            .body(blob.bytes.clone());

        let response: UploadResponse = send_json(BACKEND, request).await?;
        if response.cid.is_empty() {
            return Err(PublishError::InvalidResponse {
                backend: BACKEND,
                message: "empty cid".to_string(),
            });
        }
        debug!("Stored {} as {}", blob.filename, response.cid);
        Ok(ContentId::new(response.cid))
    }
}

#[async_trait]
impl PublisherBackend for Web3StorageBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn ensure_configured(&self) -> Result<(), PublishError> {
        self.token().map(|_| ())
    }

    #[instrument(level = "debug", skip_all, fields(filename = %blob.filename))]
    async fn upload_image(
        &self,
        blob: &NamedBlob,
        _display_name: &str,
    ) -> Result<ContentId, PublishError> {
        self.put(blob).await
    }

    #[instrument(level = "debug", skip_all, fields(name = %metadata.name))]
    async fn upload_metadata(
        &self,
        metadata: &ArtifactMetadata,
    ) -> Result<ContentId, PublishError> {
        let blob = NamedBlob::json(metadata, "metadata")?;
        self.put(&blob).await
    }

    fn image_ref(&self, cid: &ContentId, _blob: &NamedBlob) -> String {
        cid.gateway_url(&self.gateway_host)
    }
}
