//! Sources of raster snapshots for the publish pipeline
//!

use base_creative_shared::artifact::decode_data_url;
use base_creative_shared::error::ArtifactError;

/// Resolution multiplier the editor renders exports at
pub const DEFAULT_MULTIPLIER: f32 = 2.0;

/// Produces a raster encoding of the current design.
///
/// Must not perform network I/O. Returns `None` when there is no drawable
/// surface, which callers treat as "nothing to publish".
pub trait SnapshotProducer: Send + Sync {
    fn export_raster(&self, multiplier: f32) -> Option<Vec<u8>>;
}

/// Raster already rendered by the client and submitted as a data URL.
///
/// The client applies the resolution multiplier when rendering, so it is
/// ignored here.
pub struct DataUrlSnapshot {
    bytes: Option<Vec<u8>>,
}

impl DataUrlSnapshot {
    pub fn parse(data_url: Option<&str>) -> Result<Self, ArtifactError> {
        let bytes = match data_url.map(str::trim) {
            Some(value) if !value.is_empty() => Some(decode_data_url(value)?),
            _ => None,
        };
        Ok(Self { bytes })
    }
}

impl SnapshotProducer for DataUrlSnapshot {
    fn export_raster(&self, _multiplier: f32) -> Option<Vec<u8>> {
        self.bytes.clone().filter(|b| !b.is_empty())
    }
}

/// Fixed bytes
pub struct BytesSnapshot(pub Option<Vec<u8>>);

impl SnapshotProducer for BytesSnapshot {
    fn export_raster(&self, _multiplier: f32) -> Option<Vec<u8>> {
        self.0.clone().filter(|b| !b.is_empty())
    }
}
