//! In-process content-addressed store, for local development
//!

use std::collections::HashMap;

use async_trait::async_trait;
use base_creative_shared::artifact::NamedBlob;
use base_creative_shared::cid::ContentId;
use base_creative_shared::metadata::ArtifactMetadata;
use tokio::sync::RwLock;
use tracing::debug;

use super::PublisherBackend;
use crate::error::PublishError;

#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, cid: &ContentId) -> Option<Vec<u8>> {
        self.objects.read().await.get(cid).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    async fn put(&self, bytes: Vec<u8>) -> ContentId {
        let cid = ContentId::for_bytes(&bytes);
        debug!("Storing {} bytes as {}", bytes.len(), cid);
        self.objects.write().await.insert(cid.clone(), bytes);
        cid
    }
}

#[async_trait]
impl PublisherBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn ensure_configured(&self) -> Result<(), PublishError> {
        Ok(())
    }

    async fn upload_image(
        &self,
        blob: &NamedBlob,
        _display_name: &str,
    ) -> Result<ContentId, PublishError> {
        Ok(self.put(blob.bytes.clone()).await)
    }

    async fn upload_metadata(
        &self,
        metadata: &ArtifactMetadata,
    ) -> Result<ContentId, PublishError> {
        let bytes = serde_json::to_vec(metadata).map_err(|err| PublishError::Encode(err.into()))?;
        Ok(self.put(bytes).await)
    }

    fn image_ref(&self, cid: &ContentId, _blob: &NamedBlob) -> String {
        cid.ipfs_url()
    }
}
