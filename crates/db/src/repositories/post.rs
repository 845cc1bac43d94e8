//! Post repository.

use std::sync::Arc;

use crate::entities::{ContentStatus, Post, PostTag, Tag, post, post_tag, tag};
use folio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::{map_write_err, plan_tag_sync};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post: {id}")))
    }

    /// Find a published post by exact slug.
    pub async fn find_published_by_slug(&self, slug: &str) -> AppResult<Option<post::Model>> {
        Post::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Status.eq(ContentStatus::Published))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a published post whose slug is any of the given candidates.
    pub async fn find_published_by_slugs(&self, slugs: &[String]) -> AppResult<Option<post::Model>> {
        if slugs.is_empty() {
            return Ok(None);
        }

        Post::find()
            .filter(post::Column::Slug.is_in(slugs.iter().cloned()))
            .filter(post::Column::Status.eq(ContentStatus::Published))
            .order_by_desc(post::Column::PublishedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published posts with their tags, newest publication first.
    pub async fn find_published_with_tags(&self) -> AppResult<Vec<(post::Model, Vec<tag::Model>)>> {
        Post::find()
            .filter(post::Column::Status.eq(ContentStatus::Published))
            .order_by_desc(post::Column::PublishedAt)
            .order_by_asc(post::Column::Id)
            .find_with_related(Tag)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts of any status with their tags, newest first.
    pub async fn find_all_with_tags(&self) -> AppResult<Vec<(post::Model, Vec<tag::Model>)>> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .find_with_related(Tag)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags linked to a post, by name.
    pub async fn find_tags(&self, post: &post::Model) -> AppResult<Vec<tag::Model>> {
        post.find_related(Tag)
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of the tags linked to a post.
    pub async fn find_tag_ids(&self, post_id: &str) -> AppResult<Vec<String>> {
        linked_tag_ids(self.db.as_ref(), post_id).await
    }

    /// Insert a post together with its tag links in one transaction.
    pub async fn create_with_tags(
        &self,
        model: post::ActiveModel,
        tag_ids: Option<Vec<String>>,
    ) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = model.insert(&txn).await.map_err(map_write_err)?;
        if let Some(desired) = tag_ids {
            sync_tags(&txn, &post.id, &desired).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(post)
    }

    /// Update a post together with its tag links in one transaction.
    pub async fn update_with_tags(
        &self,
        model: post::ActiveModel,
        tag_ids: Option<Vec<String>>,
    ) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = model.update(&txn).await.map_err(map_write_err)?;
        if let Some(desired) = tag_ids {
            sync_tags(&txn, &post.id, &desired).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(post)
    }

    /// Delete a post. Its tag links go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Post: {id}")));
        }
        Ok(())
    }

    /// Count all posts.
    pub async fn count(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts with the given status.
    pub async fn count_by_status(&self, status: ContentStatus) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

async fn linked_tag_ids<C: ConnectionTrait>(db: &C, post_id: &str) -> AppResult<Vec<String>> {
    let links = PostTag::find()
        .filter(post_tag::Column::PostId.eq(post_id))
        .all(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(links.into_iter().map(|link| link.tag_id).collect())
}

async fn sync_tags<C: ConnectionTrait>(db: &C, post_id: &str, desired: &[String]) -> AppResult<()> {
    let existing = linked_tag_ids(db, post_id).await?;
    let plan = plan_tag_sync(&existing, desired);

    if !plan.to_remove.is_empty() {
        PostTag::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .filter(post_tag::Column::TagId.is_in(plan.to_remove))
            .exec(db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    if !plan.to_add.is_empty() {
        let links = plan.to_add.into_iter().map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id.to_string()),
            tag_id: Set(tag_id),
        });
        PostTag::insert_many(links)
            .exec_without_returning(db)
            .await
            .map_err(map_write_err)?;
    }

    Ok(())
}
