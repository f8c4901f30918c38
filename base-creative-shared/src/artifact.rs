//! Artifact encoding: raster snapshots and metadata records turned into named blobs
//!

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;

use crate::error::ArtifactError;

pub const PNG_MIME_TYPE: &str = "image/png";
pub const JSON_MIME_TYPE: &str = "application/json";

/// A binary payload ready for transmission to a storage backend
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NamedBlob {
    /// Raw content
    pub bytes: Vec<u8>,

    /// MIME type of the content (e.g., "image/png", "application/json")
    pub mime_type: String,

    /// Timestamped filename, unique within a session
    pub filename: String,
}

impl NamedBlob {
    /// Tag the bytes with a MIME type and a `{base_name}-{millis}.{ext}` filename
    pub fn encode(bytes: Vec<u8>, mime_type: &str, base_name: &str) -> Self {
        let filename = format!(
            "{}-{}.{}",
            base_name,
            Utc::now().timestamp_millis(),
            extension_for(mime_type)
        );
        Self {
            bytes,
            mime_type: mime_type.to_string(),
            filename,
        }
    }

    /// An exported design raster
    pub fn png(bytes: Vec<u8>) -> Self {
        Self::encode(bytes, PNG_MIME_TYPE, "design")
    }

    /// Pretty-printed JSON document
    pub fn json<T: Serialize>(value: &T, base_name: &str) -> Result<Self, ArtifactError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        Ok(Self::encode(bytes, JSON_MIME_TYPE, base_name))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        PNG_MIME_TYPE => "png",
        JSON_MIME_TYPE => "json",
        _ => "bin",
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL, or a bare base64 payload, into bytes
pub fn decode_data_url(input: &str) -> Result<Vec<u8>, ArtifactError> {
    let payload = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest
                .split_once(',')
                .ok_or(ArtifactError::NotBase64DataUrl)?;
            if !header.ends_with(";base64") {
                return Err(ArtifactError::NotBase64DataUrl);
            }
            data
        }
        None => input,
    };
    Ok(STANDARD.decode(payload.trim())?)
}
