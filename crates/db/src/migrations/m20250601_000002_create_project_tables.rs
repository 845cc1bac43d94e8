//! Create projects, project_tags and project_images tables.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_tag_table::Tag;

/// Values accepted by the `status` column of projects and posts.
pub(super) const STATUSES: [&str; 3] = ["draft", "published", "archived"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Project::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Project::Slug)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Project::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Project::ShortDescription).text().not_null())
                    .col(ColumnDef::new(Project::Content).text().null())
                    .col(ColumnDef::new(Project::CoverImage).string_len(1024).null())
                    .col(ColumnDef::new(Project::GithubUrl).string_len(1024).null())
                    .col(ColumnDef::new(Project::DemoUrl).string_len(1024).null())
                    .col(
                        ColumnDef::new(Project::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Project::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft")
                            .check(Expr::col(Project::Status).is_in(STATUSES)),
                    )
                    .col(
                        ColumnDef::new(Project::PublishedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Project::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Project::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Public listings filter on status and order by publish time
        manager
            .create_index(
                Index::create()
                    .name("idx_project_status_published_at")
                    .table(Project::Table)
                    .col(Project::Status)
                    .col(Project::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectTag::ProjectId).string().not_null())
                    .col(ColumnDef::new(ProjectTag::TagId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(ProjectTag::ProjectId)
                            .col(ProjectTag::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_tag_project")
                            .from(ProjectTag::Table, ProjectTag::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_tag_tag")
                            .from(ProjectTag::Table, ProjectTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_tag_tag_id")
                    .table(ProjectTag::Table)
                    .col(ProjectTag::TagId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectImage::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectImage::ProjectId).string().not_null())
                    .col(ColumnDef::new(ProjectImage::Url).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(ProjectImage::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProjectImage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_image_project")
                            .from(ProjectImage::Table, ProjectImage::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_image_project_order")
                    .table(ProjectImage::Table)
                    .col(ProjectImage::ProjectId)
                    .col(ProjectImage::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectImage::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ProjectTag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub enum Project {
    #[iden = "projects"]
    Table,
    Id,
    Slug,
    Title,
    ShortDescription,
    Content,
    CoverImage,
    GithubUrl,
    DemoUrl,
    Featured,
    Status,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectTag {
    #[iden = "project_tags"]
    Table,
    ProjectId,
    TagId,
}

#[derive(Iden)]
enum ProjectImage {
    #[iden = "project_images"]
    Table,
    Id,
    ProjectId,
    Url,
    DisplayOrder,
    CreatedAt,
}
