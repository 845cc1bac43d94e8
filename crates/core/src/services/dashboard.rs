//! Admin dashboard statistics.

use folio_common::AppResult;
use folio_db::entities::ContentStatus;
use folio_db::repositories::{ContactRepository, PostRepository, ProjectRepository, TagRepository};
use serde::Serialize;

/// Counts for one kind of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentCounts {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
}

impl ContentCounts {
    /// Derive the draft count from the total and the published count.
    #[must_use]
    pub const fn new(total: u64, published: u64) -> Self {
        Self {
            total,
            published,
            draft: total.saturating_sub(published),
        }
    }
}

/// Overview shown on the admin landing page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub projects: ContentCounts,
    pub posts: ContentCounts,
    pub tags: u64,
    pub unread_contacts: u64,
}

/// Service computing dashboard statistics.
#[derive(Clone)]
pub struct DashboardService {
    project_repo: ProjectRepository,
    post_repo: PostRepository,
    tag_repo: TagRepository,
    contact_repo: ContactRepository,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(
        project_repo: ProjectRepository,
        post_repo: PostRepository,
        tag_repo: TagRepository,
        contact_repo: ContactRepository,
    ) -> Self {
        Self {
            project_repo,
            post_repo,
            tag_repo,
            contact_repo,
        }
    }

    /// Gather the current counts.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let projects = ContentCounts::new(
            self.project_repo.count().await?,
            self.project_repo
                .count_by_status(ContentStatus::Published)
                .await?,
        );
        let posts = ContentCounts::new(
            self.post_repo.count().await?,
            self.post_repo.count_by_status(ContentStatus::Published).await?,
        );

        Ok(DashboardStats {
            projects,
            posts,
            tags: self.tag_repo.count().await?,
            unread_contacts: self.contact_repo.count_unread().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[test]
    fn test_draft_is_total_minus_published() {
        assert_eq!(ContentCounts::new(7, 4).draft, 3);
        assert_eq!(ContentCounts::new(0, 0).draft, 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    [count_row(5)],
                    [count_row(3)],
                    [count_row(8)],
                    [count_row(6)],
                    [count_row(12)],
                    [count_row(2)],
                ])
                .into_connection(),
        );

        let service = DashboardService::new(
            ProjectRepository::new(db.clone()),
            PostRepository::new(db.clone()),
            TagRepository::new(db.clone()),
            ContactRepository::new(db),
        );
        let stats = service.stats().await.unwrap();

        assert_eq!(stats.projects, ContentCounts::new(5, 3));
        assert_eq!(stats.posts.draft, 2);
        assert_eq!(stats.tags, 12);
        assert_eq!(stats.unread_contacts, 2);
    }
}
