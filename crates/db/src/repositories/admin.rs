//! Admin account and session repository.

use std::sync::Arc;

use crate::entities::{AdminSession, AdminUser, admin_session, admin_user};
use chrono::Utc;
use folio_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::map_write_err;

/// Repository for admin users and their sessions.
#[derive(Clone)]
pub struct AdminRepository {
    db: Arc<DatabaseConnection>,
}

impl AdminRepository {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an admin by email.
    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<admin_user::Model>> {
        AdminUser::find()
            .filter(admin_user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an admin by ID.
    pub async fn find_user_by_id(&self, id: &str) -> AppResult<Option<admin_user::Model>> {
        AdminUser::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an admin account.
    pub async fn create_user(&self, model: admin_user::ActiveModel) -> AppResult<admin_user::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Store a new session.
    pub async fn create_session(
        &self,
        model: admin_session::ActiveModel,
    ) -> AppResult<admin_session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an unexpired session by token hash.
    pub async fn find_active_session(
        &self,
        token_hash: &str,
    ) -> AppResult<Option<admin_session::Model>> {
        AdminSession::find()
            .filter(admin_session::Column::TokenHash.eq(token_hash))
            .filter(admin_session::Column::ExpiresAt.gt(Utc::now()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the session with the given token hash.
    pub async fn delete_session(&self, token_hash: &str) -> AppResult<()> {
        AdminSession::delete_many()
            .filter(admin_session::Column::TokenHash.eq(token_hash))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete every expired session, returning how many were removed.
    pub async fn delete_expired_sessions(&self) -> AppResult<u64> {
        let result = AdminSession::delete_many()
            .filter(admin_session::Column::ExpiresAt.lte(Utc::now()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
