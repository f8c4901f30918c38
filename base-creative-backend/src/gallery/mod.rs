//! Local record of completed publishes
//!

use async_trait::async_trait;
use base_creative_shared::gallery::GalleryEntry;
use sea_orm::DbErr;
use tokio::sync::RwLock;

mod sqlite;

pub use sqlite::SqliteGallery;

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Persists the gallery list as a whole.
///
/// Writers are not coordinated: two concurrent appends can lose an update.
#[async_trait]
pub trait GalleryStore: Send + Sync {
    /// Entries, newest first
    async fn read(&self) -> Result<Vec<GalleryEntry>, GalleryError>;

    /// Replace the whole list
    async fn write(&self, entries: &[GalleryEntry]) -> Result<(), GalleryError>;
}

/// Prepend an entry, returning the new length of the list
pub async fn append(store: &dyn GalleryStore, entry: GalleryEntry) -> Result<usize, GalleryError> {
    let mut entries = store.read().await?;
    entries.insert(0, entry);
    store.write(&entries).await?;
    Ok(entries.len())
}

#[derive(Default)]
pub struct MemoryGallery {
    entries: RwLock<Vec<GalleryEntry>>,
}

impl MemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GalleryStore for MemoryGallery {
    async fn read(&self) -> Result<Vec<GalleryEntry>, GalleryError> {
        Ok(self.entries.read().await.clone())
    }

    async fn write(&self, entries: &[GalleryEntry]) -> Result<(), GalleryError> {
        *self.entries.write().await = entries.to_vec();
        Ok(())
    }
}
