//! Blog post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::ContentStatus;

/// A blog article.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// URL-safe unique identifier.
    #[sea_orm(unique, indexed)]
    pub slug: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub excerpt: String,

    /// Markdown body.
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    #[sea_orm(nullable)]
    pub cover_image: Option<String>,

    #[sea_orm(nullable)]
    pub reading_time_minutes: Option<i32>,

    pub status: ContentStatus,

    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,

    /// Project this article writes about, if any.
    #[sea_orm(nullable, indexed)]
    pub project_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_tag::Entity")]
    PostTags,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "SetNull"
    )]
    Project,
}

impl Related<super::post_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTags.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::post_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::post_tag::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
