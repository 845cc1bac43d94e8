//! Create tags table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tag::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tag::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Tag::Slug)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tag::IconPath).string_len(1024).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tag_name")
                    .table(Tag::Table)
                    .col(Tag::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Tag {
    #[iden = "tags"]
    Table,
    Id,
    Name,
    Slug,
    IconPath,
}
