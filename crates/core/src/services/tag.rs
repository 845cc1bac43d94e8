//! Tag service.

use folio_common::{AppResult, IdGenerator};
use folio_db::entities::tag;
use folio_db::repositories::TagRepository;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::cache::RouteCache;
use super::forms::{non_empty, required, required_slug};
use super::post::BLOG_ROUTE;
use super::project::PROJECTS_ROUTE;

/// Public route prefix for tags.
pub const TAGS_ROUTE: &str = "/tags";

/// Routes whose output embeds tags.
const TAG_ROUTES: [&str; 3] = [TAGS_ROUTE, PROJECTS_ROUTE, BLOG_ROUTE];

/// Admin tag form.
#[derive(Debug, Default, Deserialize)]
pub struct TagForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub icon_path: Option<String>,
}

#[derive(Debug)]
struct TagFields {
    name: String,
    slug: String,
    icon_path: Option<String>,
}

impl TagForm {
    fn parse(self) -> AppResult<TagFields> {
        let name = required(self.name, "Name")?;
        let slug = required_slug(self.slug)?;

        Ok(TagFields {
            name,
            slug,
            icon_path: non_empty(self.icon_path),
        })
    }
}

/// Tag as shown in listings and detail views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon_path: Option<String>,
}

impl From<tag::Model> for TagResponse {
    fn from(t: tag::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            slug: t.slug,
            icon_path: t.icon_path,
        }
    }
}

/// Service for managing tags.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    cache: RouteCache,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository, cache: RouteCache) -> Self {
        Self {
            tag_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// All tags by name.
    pub async fn list(&self) -> AppResult<Vec<TagResponse>> {
        let tags = self.tag_repo.find_all().await?;
        Ok(tags.into_iter().map(Into::into).collect())
    }

    /// A single tag.
    pub async fn get(&self, id: &str) -> AppResult<TagResponse> {
        Ok(self.tag_repo.get_by_id(id).await?.into())
    }

    /// Create a tag.
    pub async fn create(&self, form: TagForm) -> AppResult<tag::Model> {
        let fields = form.parse()?;

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(fields.name),
            slug: Set(fields.slug),
            icon_path: Set(fields.icon_path),
        };

        let tag = self.tag_repo.create(model).await?;
        tracing::info!(tag_id = %tag.id, slug = %tag.slug, "Created tag");
        self.revalidate().await;
        Ok(tag)
    }

    /// Replace a tag's fields.
    pub async fn update(&self, id: &str, form: TagForm) -> AppResult<tag::Model> {
        let fields = form.parse()?;
        let existing = self.tag_repo.get_by_id(id).await?;

        let mut model: tag::ActiveModel = existing.into();
        model.name = Set(fields.name);
        model.slug = Set(fields.slug);
        model.icon_path = Set(fields.icon_path);

        let tag = self.tag_repo.update(model).await?;
        tracing::info!(tag_id = %tag.id, "Updated tag");
        self.revalidate().await;
        Ok(tag)
    }

    /// Delete a tag. Projects and posts keep existing without it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.tag_repo.delete(id).await?;
        tracing::info!(tag_id = %id, "Deleted tag");
        self.revalidate().await;
        Ok(())
    }

    async fn revalidate(&self) {
        for route in TAG_ROUTES {
            self.cache.revalidate(route).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_tag(id: &str, name: &str) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            icon_path: None,
        }
    }

    #[test]
    fn test_form_requires_name_and_slug() {
        let form = TagForm {
            name: Some("Rust".into()),
            slug: Some("  ".into()),
            icon_path: None,
        };
        assert!(matches!(form.parse(), Err(AppError::Validation(_))));

        let form = TagForm {
            name: None,
            slug: Some("rust".into()),
            icon_path: None,
        };
        assert!(matches!(form.parse(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_form_blank_icon_is_none() {
        let fields = TagForm {
            name: Some("Rust".into()),
            slug: Some("rust".into()),
            icon_path: Some(String::new()),
        }
        .parse()
        .unwrap();
        assert_eq!(fields.icon_path, None);
    }

    #[tokio::test]
    async fn test_list() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_tag("t1", "Axum"),
                    create_test_tag("t2", "Rust"),
                ]])
                .into_connection(),
        );

        let service = TagService::new(TagRepository::new(db), RouteCache::disabled());
        let tags = service.list().await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "Axum");
    }

    #[tokio::test]
    async fn test_delete_revalidates_dependent_routes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let cache = RouteCache::new(std::time::Duration::from_secs(60));
        cache.insert("/tags", json!([])).await;
        cache.insert("/projects/folio", json!({})).await;
        cache.insert("/blog?tag=Rust", json!([])).await;

        let service = TagService::new(TagRepository::new(db), cache.clone());
        service.delete("t1").await.unwrap();

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = TagService::new(TagRepository::new(db), RouteCache::disabled());
        let err = service.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
