//! Project repository.

use std::sync::Arc;

use crate::entities::{
    ContentStatus, Project, ProjectImage, ProjectTag, Tag, project, project_image, project_tag,
    tag,
};
use folio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::{map_write_err, plan_tag_sync};

/// Project repository for database operations.
#[derive(Clone)]
pub struct ProjectRepository {
    db: Arc<DatabaseConnection>,
}

impl ProjectRepository {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<project::Model>> {
        Project::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a project by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<project::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project: {id}")))
    }

    /// Find a published project by exact slug.
    pub async fn find_published_by_slug(&self, slug: &str) -> AppResult<Option<project::Model>> {
        Project::find()
            .filter(project::Column::Slug.eq(slug))
            .filter(project::Column::Status.eq(ContentStatus::Published))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a published project whose slug is any of the given candidates.
    pub async fn find_published_by_slugs(
        &self,
        slugs: &[String],
    ) -> AppResult<Option<project::Model>> {
        if slugs.is_empty() {
            return Ok(None);
        }

        Project::find()
            .filter(project::Column::Slug.is_in(slugs.iter().cloned()))
            .filter(project::Column::Status.eq(ContentStatus::Published))
            .order_by_desc(project::Column::PublishedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published projects with their tags, newest publication first.
    pub async fn find_published_with_tags(
        &self,
    ) -> AppResult<Vec<(project::Model, Vec<tag::Model>)>> {
        Project::find()
            .filter(project::Column::Status.eq(ContentStatus::Published))
            .order_by_desc(project::Column::PublishedAt)
            .order_by_asc(project::Column::Id)
            .find_with_related(Tag)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All projects of any status with their tags, newest first.
    pub async fn find_all_with_tags(&self) -> AppResult<Vec<(project::Model, Vec<tag::Model>)>> {
        Project::find()
            .order_by_desc(project::Column::CreatedAt)
            .order_by_asc(project::Column::Id)
            .find_with_related(Tag)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags linked to a project, by name.
    pub async fn find_tags(&self, project: &project::Model) -> AppResult<Vec<tag::Model>> {
        project
            .find_related(Tag)
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of the tags linked to a project.
    pub async fn find_tag_ids(&self, project_id: &str) -> AppResult<Vec<String>> {
        linked_tag_ids(self.db.as_ref(), project_id).await
    }

    /// Gallery images of a project in display order.
    pub async fn find_images(&self, project_id: &str) -> AppResult<Vec<project_image::Model>> {
        ProjectImage::find()
            .filter(project_image::Column::ProjectId.eq(project_id))
            .order_by_asc(project_image::Column::DisplayOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a project together with its tag links and gallery.
    ///
    /// `None` leaves the corresponding association untouched. All writes
    /// share one transaction.
    pub async fn create_with_associations(
        &self,
        model: project::ActiveModel,
        tag_ids: Option<Vec<String>>,
        images: Option<Vec<project_image::ActiveModel>>,
    ) -> AppResult<project::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let project = model.insert(&txn).await.map_err(map_write_err)?;
        write_associations(&txn, &project.id, tag_ids, images).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(project)
    }

    /// Update a project together with its tag links and gallery.
    pub async fn update_with_associations(
        &self,
        model: project::ActiveModel,
        tag_ids: Option<Vec<String>>,
        images: Option<Vec<project_image::ActiveModel>>,
    ) -> AppResult<project::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let project = model.update(&txn).await.map_err(map_write_err)?;
        write_associations(&txn, &project.id, tag_ids, images).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(project)
    }

    /// Delete a project. Tag links and gallery images go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Project::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Project: {id}")));
        }
        Ok(())
    }

    /// Count all projects.
    pub async fn count(&self) -> AppResult<u64> {
        Project::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count projects with the given status.
    pub async fn count_by_status(&self, status: ContentStatus) -> AppResult<u64> {
        Project::find()
            .filter(project::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn linked_tag_ids<C: ConnectionTrait>(db: &C, project_id: &str) -> AppResult<Vec<String>> {
    let links = ProjectTag::find()
        .filter(project_tag::Column::ProjectId.eq(project_id))
        .all(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(links.into_iter().map(|link| link.tag_id).collect())
}

async fn write_associations<C: ConnectionTrait>(
    db: &C,
    project_id: &str,
    tag_ids: Option<Vec<String>>,
    images: Option<Vec<project_image::ActiveModel>>,
) -> AppResult<()> {
    if let Some(desired) = tag_ids {
        let existing = linked_tag_ids(db, project_id).await?;
        let plan = plan_tag_sync(&existing, &desired);

        if !plan.to_remove.is_empty() {
            ProjectTag::delete_many()
                .filter(project_tag::Column::ProjectId.eq(project_id))
                .filter(project_tag::Column::TagId.is_in(plan.to_remove))
                .exec(db)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if !plan.to_add.is_empty() {
            let links = plan.to_add.into_iter().map(|tag_id| project_tag::ActiveModel {
                project_id: Set(project_id.to_string()),
                tag_id: Set(tag_id),
            });
            ProjectTag::insert_many(links)
                .exec_without_returning(db)
                .await
                .map_err(map_write_err)?;
        }
    }

    if let Some(images) = images {
        ProjectImage::delete_many()
            .filter(project_image::Column::ProjectId.eq(project_id))
            .exec(db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !images.is_empty() {
            ProjectImage::insert_many(images)
                .exec_without_returning(db)
                .await
                .map_err(map_write_err)?;
        }
    }

    Ok(())
}
