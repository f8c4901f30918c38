//! Request and response bodies of the publish API
//!

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cid::ContentId;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublishDesignRequest {
    /// PNG as a `data:image/png;base64,...` URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishDesignResponse {
    pub success: bool,
    #[schema(value_type = String)]
    pub image_cid: ContentId,
    #[schema(value_type = String)]
    pub metadata_cid: ContentId,
    /// `ipfs://{metadataCid}`
    pub ipfs_url: String,
}

impl PublishDesignResponse {
    pub fn new(image_cid: ContentId, metadata_cid: ContentId) -> Self {
        let ipfs_url = metadata_cid.ipfs_url();
        Self {
            success: true,
            image_cid,
            metadata_cid,
            ipfs_url,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordDesignResponse {
    #[schema(value_type = String)]
    pub cid: ContentId,
    pub transaction_hash: String,
}
