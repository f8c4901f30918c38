use async_trait::async_trait;
use base_creative_shared::gallery::GalleryEntry;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait};
use tracing::debug;

use super::{GalleryError, GalleryStore};
use crate::entity::gallery_entry;

/// Gallery kept in the service database, ordered by a position column
pub struct SqliteGallery {
    conn: DatabaseConnection,
}

impl SqliteGallery {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl GalleryStore for SqliteGallery {
    async fn read(&self) -> Result<Vec<GalleryEntry>, GalleryError> {
        let rows = gallery_entry::Entity::find()
            .order_by_asc(gallery_entry::Column::Position)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(GalleryEntry::from).collect())
    }

    async fn write(&self, entries: &[GalleryEntry]) -> Result<(), GalleryError> {
        let txn = self.conn.begin().await?;

        gallery_entry::Entity::delete_many().exec(&txn).await?;

        if !entries.is_empty() {
            let rows = entries
                .iter()
                .enumerate()
                .map(|(position, entry)| gallery_entry::ActiveModel {
                    id: NotSet,
                    position: Set(position as i32),
                    cid: Set(entry.cid.to_string()),
                    image: Set(entry.image.clone()),
                    name: Set(entry.name.clone()),
                    timestamp: Set(entry.timestamp.clone()),
                });
            gallery_entry::Entity::insert_many(rows).exec(&txn).await?;
        }

        txn.commit().await?;
        debug!("Wrote {} gallery entries", entries.len());
        Ok(())
    }
}
