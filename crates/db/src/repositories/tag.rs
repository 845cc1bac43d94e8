//! Tag repository.

use std::sync::Arc;

use crate::entities::{Tag, tag};
use folio_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};

use super::map_write_err;

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a tag by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag: {id}")))
    }

    /// All tags ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Update a tag.
    pub async fn update(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Delete a tag. Only its links to projects and posts are removed.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Tag::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Tag: {id}")));
        }
        Ok(())
    }

    /// Count all tags.
    pub async fn count(&self) -> AppResult<u64> {
        Tag::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
