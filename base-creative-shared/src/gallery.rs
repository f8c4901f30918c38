use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cid::ContentId;

/// One completed publish, as listed in the gallery
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GalleryEntry {
    /// CID of the metadata record
    #[schema(value_type = String)]
    pub cid: ContentId,
    /// Image reference carried by the metadata record
    pub image: String,
    pub name: String,
    /// ISO-8601 publish time
    pub timestamp: String,
}
