use base_creative_shared::gallery::GalleryEntry;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Index in the gallery list, 0 is the newest
    pub position: i32,
    /// CID of the metadata record
    pub cid: String,
    pub image: String,
    pub name: String,
    pub timestamp: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for GalleryEntry {
    fn from(model: Model) -> Self {
        Self {
            cid: model.cid.into(),
            image: model.image,
            name: model.name,
            timestamp: model.timestamp,
        }
    }
}
