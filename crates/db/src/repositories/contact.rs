//! Contact message repository.

use std::sync::Arc;

use crate::entities::{Contact, contact};
use folio_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};

/// Contact message repository for database operations.
#[derive(Clone)]
pub struct ContactRepository {
    db: Arc<DatabaseConnection>,
}

impl ContactRepository {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a new message.
    pub async fn create(&self, model: contact::ActiveModel) -> AppResult<contact::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All messages, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<contact::Model>> {
        Contact::find()
            .order_by_desc(contact::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a message as read.
    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        let result = Contact::update_many()
            .col_expr(contact::Column::Read, Expr::value(true))
            .filter(contact::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Contact: {id}")));
        }
        Ok(())
    }

    /// Delete a message.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Contact::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Contact: {id}")));
        }
        Ok(())
    }

    /// Count messages not yet read.
    pub async fn count_unread(&self) -> AppResult<u64> {
        Contact::find()
            .filter(contact::Column::Read.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
