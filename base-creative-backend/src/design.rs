use axum::extract::{Path, State};
use axum::Json;
use base_creative_shared::api::{
    ErrorResponse, PublishDesignRequest, PublishDesignResponse, RecordDesignResponse,
};
use base_creative_shared::cid::ContentId;
use base_creative_shared::gallery::GalleryEntry;
use tracing::{debug, instrument};

use crate::chain::ChainError;
use crate::error::{PipelineError, WebError};
use crate::pipeline::PublishRequest;
use crate::snapshot::DataUrlSnapshot;
use crate::SharedState;

/// Publish a design image and its metadata to IPFS
#[utoipa::path(
    post,
    path = "/api/v1/ipfs",
    request_body = PublishDesignRequest,
    responses(
        (status = 200, description = "Design published", body = PublishDesignResponse),
        (status = 400, description = "No image or name supplied", body = ErrorResponse),
        (status = 409, description = "Another publish is in flight", body = ErrorResponse),
        (status = 408, description = "Request timed out; the publish still completes", body = ErrorResponse),
        (status = 500, description = "Storage credentials are not configured", body = ErrorResponse),
        (status = 502, description = "Storage backend failed", body = ErrorResponse),
    )
)]
#[instrument(level = "info", skip_all)]
pub async fn publish_design(
    State(state): State<SharedState>,
    Json(request): Json<PublishDesignRequest>,
) -> Result<Json<PublishDesignResponse>, WebError> {
    let name = match request.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(PipelineError::NoArtifact.into()),
    };

    let snapshot = DataUrlSnapshot::parse(request.image.as_deref()).map_err(PipelineError::from)?;

    let pipeline = state.read().await.pipeline();
    let request = PublishRequest {
        name,
        description: request.description,
    };

    // the run must finish or fail even if this request is dropped
    let receipt = tokio::spawn(async move { pipeline.run(&snapshot, &request).await })
        .await
        .map_err(|err| PipelineError::Aborted(err.to_string()))??;

    Ok(Json(PublishDesignResponse::from(&receipt)))
}

/// Previously published designs, newest first
#[utoipa::path(
    get,
    path = "/api/v1/gallery",
    responses(
        (status = 200, description = "Gallery entries", body = Vec<GalleryEntry>),
        (status = 500, description = "Gallery could not be read", body = ErrorResponse),
    )
)]
pub async fn list_gallery(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GalleryEntry>>, WebError> {
    let gallery = state.read().await.gallery.clone();
    let entries = gallery.read().await?;
    debug!("Listing {} gallery entries", entries.len());
    Ok(Json(entries))
}

/// Record a published metadata CID on chain
#[utoipa::path(
    post,
    path = "/api/v1/design/{cid}/record",
    params(("cid" = String, Path, description = "Metadata CID returned by a publish")),
    responses(
        (status = 200, description = "Transaction submitted", body = RecordDesignResponse),
        (status = 502, description = "Wallet bridge failed", body = ErrorResponse),
        (status = 503, description = "Chain recording not configured", body = ErrorResponse),
    )
)]
#[instrument(level = "info", skip(state))]
pub async fn record_design(
    State(state): State<SharedState>,
    Path(cid): Path<String>,
) -> Result<Json<RecordDesignResponse>, WebError> {
    if cid.trim().is_empty() {
        return Err(WebError::bad_request("Missing CID"));
    }
    let recorder = state
        .read()
        .await
        .chain
        .clone()
        .ok_or(ChainError::NotConfigured)?;

    let cid = ContentId::new(cid);
    let transaction_hash = recorder.record(&cid).await?;

    Ok(Json(RecordDesignResponse {
        cid,
        transaction_hash,
    }))
}
