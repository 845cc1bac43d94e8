//! Project entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::ContentStatus;

/// A portfolio project case study.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// URL-safe unique identifier.
    #[sea_orm(unique, indexed)]
    pub slug: String,

    pub title: String,

    /// One-paragraph summary shown on cards.
    #[sea_orm(column_type = "Text")]
    pub short_description: String,

    /// Markdown body.
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    #[sea_orm(nullable)]
    pub cover_image: Option<String>,

    #[sea_orm(nullable)]
    pub github_url: Option<String>,

    #[sea_orm(nullable)]
    pub demo_url: Option<String>,

    #[sea_orm(default_value = false)]
    pub featured: bool,

    pub status: ContentStatus,

    /// Set the first time the project is published.
    #[sea_orm(nullable)]
    pub published_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_tag::Entity")]
    ProjectTags,
    #[sea_orm(has_many = "super::project_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::project_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectTags.def()
    }
}

impl Related<super::project_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::project_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::project_tag::Relation::Project.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
