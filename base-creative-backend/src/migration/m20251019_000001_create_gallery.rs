use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GalleryEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GalleryEntry::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GalleryEntry::Position).integer().not_null())
                    .col(ColumnDef::new(GalleryEntry::Cid).string().not_null())
                    .col(ColumnDef::new(GalleryEntry::Image).string().not_null())
                    .col(ColumnDef::new(GalleryEntry::Name).string().not_null())
                    .col(ColumnDef::new(GalleryEntry::Timestamp).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gallery_entry_position")
                    .table(GalleryEntry::Table)
                    .col(GalleryEntry::Position)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GalleryEntry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GalleryEntry {
    Table,
    Id,
    Position,
    Cid,
    Image,
    Name,
    Timestamp,
}
