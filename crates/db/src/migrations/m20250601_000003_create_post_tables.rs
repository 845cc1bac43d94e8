//! Create posts and post_tags tables.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_tag_table::Tag;
use super::m20250601_000002_create_project_tables::{Project, STATUSES};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Post::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Post::Slug)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Post::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Post::Excerpt).text().not_null())
                    .col(ColumnDef::new(Post::Content).text().null())
                    .col(ColumnDef::new(Post::CoverImage).string_len(1024).null())
                    .col(ColumnDef::new(Post::ReadingTimeMinutes).integer().null())
                    .col(
                        ColumnDef::new(Post::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft")
                            .check(Expr::col(Post::Status).is_in(STATUSES)),
                    )
                    .col(
                        ColumnDef::new(Post::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Post::ProjectId).string().null())
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Post::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_project")
                            .from(Post::Table, Post::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_status_published_at")
                    .table(Post::Table)
                    .col(Post::Status)
                    .col(Post::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_project_id")
                    .table(Post::Table)
                    .col(Post::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostTag::PostId).string().not_null())
                    .col(ColumnDef::new(PostTag::TagId).string().not_null())
                    .primary_key(Index::create().col(PostTag::PostId).col(PostTag::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tag_post")
                            .from(PostTag::Table, PostTag::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tag_tag")
                            .from(PostTag::Table, PostTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_tag_tag_id")
                    .table(PostTag::Table)
                    .col(PostTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostTag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Post {
    #[iden = "posts"]
    Table,
    Id,
    Slug,
    Title,
    Excerpt,
    Content,
    CoverImage,
    ReadingTimeMinutes,
    Status,
    PublishedAt,
    ProjectId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PostTag {
    #[iden = "post_tags"]
    Table,
    PostId,
    TagId,
}
