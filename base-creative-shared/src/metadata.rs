//! Metadata records describing a published design
//!

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Used when a design is published without a description
pub const DEFAULT_DESCRIPTION: &str = "Created with BaseCreative";
/// Value of the tool attribute attached to every record
pub const TOOL_NAME: &str = "BaseCreative Editor";
pub const TOOL_TRAIT: &str = "Tool";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// ERC-721 style description of a published design
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactMetadata {
    pub name: String,
    pub description: String,
    /// URI of the previously published image (`ipfs://...` or a gateway URL)
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// ISO-8601, millisecond precision
    pub timestamp: String,
    pub attributes: Vec<Attribute>,
}

impl ArtifactMetadata {
    pub fn build(
        name: &str,
        description: Option<&str>,
        image_ref: &str,
        tool_name: &str,
    ) -> Self {
        let description = match description.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => DEFAULT_DESCRIPTION.to_string(),
        };

        Self {
            name: name.to_string(),
            description,
            image: image_ref.to_string(),
            external_url: None,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            attributes: vec![Attribute {
                trait_type: TOOL_TRAIT.to_string(),
                value: tool_name.to_string(),
            }],
        }
    }

    pub fn with_external_url(mut self, url: Option<String>) -> Self {
        self.external_url = url;
        self
    }
}
