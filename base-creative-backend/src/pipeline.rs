//! Export-and-publish pipeline: snapshot, image upload, metadata upload, gallery record
//!

use std::fmt;
use std::sync::Arc;

use base_creative_shared::api::PublishDesignResponse;
use base_creative_shared::artifact::NamedBlob;
use base_creative_shared::cid::ContentId;
use base_creative_shared::gallery::GalleryEntry;
use base_creative_shared::metadata::{ArtifactMetadata, TOOL_NAME};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::PipelineError;
use crate::gallery::{self, GalleryStore};
use crate::publisher::PublisherBackend;
use crate::snapshot::{SnapshotProducer, DEFAULT_MULTIPLIER};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PipelineState {
    Idle,
    Snapshotting,
    UploadingImage,
    BuildingMetadata,
    UploadingMetadata,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            PipelineState::Snapshotting
                | PipelineState::UploadingImage
                | PipelineState::BuildingMetadata
                | PipelineState::UploadingMetadata
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub image_cid: ContentId,
    pub metadata_cid: ContentId,
    pub image_ref: String,
    pub metadata: ArtifactMetadata,
}

impl PublishReceipt {
    pub fn ipfs_url(&self) -> String {
        self.metadata_cid.ipfs_url()
    }
}

impl From<&PublishReceipt> for PublishDesignResponse {
    fn from(receipt: &PublishReceipt) -> Self {
        PublishDesignResponse::new(receipt.image_cid.clone(), receipt.metadata_cid.clone())
    }
}

/// Drives one publish at a time.
///
/// A run started while another is in flight on the same instance fails
/// with [`PipelineError::Busy`]. Callers that may be cancelled (HTTP
/// handlers) spawn the run so it finishes or fails on its own.
pub struct Pipeline {
    publisher: Arc<dyn PublisherBackend>,
    gallery: Arc<dyn GalleryStore>,
    tool_name: String,
    external_url: Option<String>,
    state: watch::Sender<PipelineState>,
}

impl Pipeline {
    pub fn new(publisher: Arc<dyn PublisherBackend>, gallery: Arc<dyn GalleryStore>) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            publisher,
            gallery,
            tool_name: TOOL_NAME.to_string(),
            external_url: None,
            state,
        }
    }

    pub fn with_external_url(mut self, external_url: Option<String>) -> Self {
        self.external_url = external_url;
        self
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    fn transition(&self, next: PipelineState) {
        debug!(state = %next, "pipeline transition");
        self.state.send_replace(next);
    }

    #[instrument(level = "info", skip_all, fields(backend = self.publisher.name(), name = %request.name))]
    pub async fn run(
        &self,
        snapshot: &dyn SnapshotProducer,
        request: &PublishRequest,
    ) -> Result<PublishReceipt, PipelineError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_running() {
                false
            } else {
                *state = PipelineState::Snapshotting;
                true
            }
        });
        if !started {
            warn!("Publish requested while another is in flight");
            return Err(PipelineError::Busy);
        }

        let guard = RunGuard { pipeline: self };
        let result = self.execute(snapshot, request).await;
        match &result {
            Ok(receipt) => {
                info!(
                    image_cid = %receipt.image_cid,
                    metadata_cid = %receipt.metadata_cid,
                    ipfs_url = %receipt.ipfs_url(),
                    "Design published"
                );
                guard.finish(PipelineState::Done);
            }
            Err(PipelineError::NoArtifact) => {
                debug!("Nothing to publish");
                guard.finish(PipelineState::Idle);
            }
            Err(err) => {
                error!(error = %err, "Publish failed");
                guard.finish(PipelineState::Failed);
            }
        }
        result
    }

    async fn execute(
        &self,
        snapshot: &dyn SnapshotProducer,
        request: &PublishRequest,
    ) -> Result<PublishReceipt, PipelineError> {
        let raster = snapshot
            .export_raster(DEFAULT_MULTIPLIER)
            .filter(|bytes| !bytes.is_empty())
            .ok_or(PipelineError::NoArtifact)?;

        self.publisher.ensure_configured()?;

        let image = NamedBlob::png(raster);

        self.transition(PipelineState::UploadingImage);
        let image_cid = self.publisher.upload_image(&image, &request.name).await?;

        self.transition(PipelineState::BuildingMetadata);
        let image_ref = self.publisher.image_ref(&image_cid, &image);
        let metadata = ArtifactMetadata::build(
            &request.name,
            request.description.as_deref(),
            &image_ref,
            &self.tool_name,
        )
        .with_external_url(self.external_url.clone());

        self.transition(PipelineState::UploadingMetadata);
        let metadata_cid = self.publisher.upload_metadata(&metadata).await?;

        let entry = GalleryEntry {
            cid: metadata_cid.clone(),
            image: image_ref.clone(),
            name: metadata.name.clone(),
            timestamp: metadata.timestamp.clone(),
        };
        gallery::append(self.gallery.as_ref(), entry).await?;

        Ok(PublishReceipt {
            image_cid,
            metadata_cid,
            image_ref,
            metadata,
        })
    }
}

/// Marks a run failed if it unwinds before reaching a final state
struct RunGuard<'a> {
    pipeline: &'a Pipeline,
}

impl RunGuard<'_> {
    fn finish(self, next: PipelineState) {
        self.pipeline.transition(next);
        std::mem::forget(self);
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.pipeline.state.send_if_modified(|state| {
            if state.is_running() {
                *state = PipelineState::Failed;
                true
            } else {
                false
            }
        });
    }
}
