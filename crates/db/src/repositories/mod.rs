//! Data access repositories.

mod admin;
mod contact;
mod post;
mod project;
mod tag;

pub use admin::AdminRepository;
pub use contact::ContactRepository;
pub use post::PostRepository;
pub use project::ProjectRepository;
pub use tag::TagRepository;

use std::collections::HashSet;

use folio_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an error raised by an insert or update.
///
/// Unique violations become [`AppError::Conflict`] and dangling references
/// become [`AppError::BadRequest`]; everything else is a database error.
pub(crate) fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, "Unique constraint violated");
            AppError::Conflict("A record with this slug already exists".to_string())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            tracing::debug!(%detail, "Foreign key constraint violated");
            AppError::BadRequest("Referenced record does not exist".to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// Changes needed to turn one set of tag ids into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSyncPlan {
    /// Tag ids currently linked but not wanted.
    pub to_remove: Vec<String>,
    /// Tag ids wanted but not yet linked, in first-seen order.
    pub to_add: Vec<String>,
}

impl TagSyncPlan {
    /// Whether the plan leaves the associations as they are.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Diff the linked tag ids against the desired ones.
///
/// Duplicates in `desired` collapse to a single association.
#[must_use]
pub fn plan_tag_sync(existing: &[String], desired: &[String]) -> TagSyncPlan {
    let existing_set: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let to_add = desired
        .iter()
        .filter(|id| !existing_set.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect();

    let to_remove = existing
        .iter()
        .filter(|id| !desired_set.contains(id.as_str()))
        .cloned()
        .collect();

    TagSyncPlan { to_remove, to_add }
}
