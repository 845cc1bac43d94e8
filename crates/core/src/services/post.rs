//! Blog post service.

use chrono::Utc;
use folio_common::{AppResult, IdGenerator};
use folio_db::entities::{ContentStatus, post, tag};
use folio_db::repositories::{PostRepository, ProjectRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::cache::RouteCache;
use super::forms::{
    non_empty, parse_id_list, parse_optional_int, parse_status, required, required_slug,
    resolve_published_at, slug_variants,
};
use super::listing::{self, ListQuery};
use super::tag::TagResponse;

/// Public route prefix for posts.
pub const BLOG_ROUTE: &str = "/blog";

/// Length of the excerpt derived from content when none is given.
const EXCERPT_CHARS: usize = 180;

/// Admin post form.
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub reading_time_minutes: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug)]
struct PostFields {
    title: String,
    slug: String,
    excerpt: String,
    content: Option<String>,
    cover_image: Option<String>,
    reading_time_minutes: Option<i32>,
    status: ContentStatus,
    project_id: Option<String>,
    tag_ids: Option<Vec<String>>,
}

impl PostForm {
    fn parse(self) -> AppResult<PostFields> {
        let content = non_empty(self.content);
        let reading_time_minutes =
            parse_optional_int(self.reading_time_minutes.as_deref(), "Reading time")?
                .or_else(|| content.as_deref().map(folio_markdown::reading_time_minutes));

        Ok(PostFields {
            title: required(self.title, "Title")?,
            slug: required_slug(self.slug)?,
            excerpt: non_empty(self.excerpt)
                .or_else(|| content.as_deref().map(|md| folio_markdown::excerpt(md, EXCERPT_CHARS)))
                .unwrap_or_default(),
            content,
            cover_image: non_empty(self.cover_image),
            reading_time_minutes,
            status: parse_status(self.status.as_deref())?,
            project_id: non_empty(self.project_id),
            tag_ids: parse_id_list(self.tags.as_deref(), "tags"),
        })
    }
}

/// Post as shown in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub reading_time_minutes: Option<i32>,
    pub status: ContentStatus,
    pub project_id: Option<String>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub tags: Vec<TagResponse>,
}

impl From<(post::Model, Vec<tag::Model>)> for PostSummary {
    fn from((p, tags): (post::Model, Vec<tag::Model>)) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            excerpt: p.excerpt,
            cover_image: p.cover_image,
            reading_time_minutes: p.reading_time_minutes,
            status: p.status,
            project_id: p.project_id,
            published_at: p.published_at.map(|t| t.to_rfc3339()),
            created_at: p.created_at.to_rfc3339(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Published project a post writes about.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLink {
    pub id: String,
    pub slug: String,
    pub title: String,
}

/// Blog article page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostSummary,
    pub content: Option<String>,
    pub content_html: String,
    pub project: Option<ProjectLink>,
    pub updated_at: String,
}

/// Post as loaded into the admin edit form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEdit {
    #[serde(flatten)]
    pub post: PostSummary,
    pub content: Option<String>,
    pub tag_ids: Vec<String>,
    pub updated_at: String,
}

/// Service for managing blog posts.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    project_repo: ProjectRepository,
    cache: RouteCache,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        project_repo: ProjectRepository,
        cache: RouteCache,
    ) -> Self {
        Self {
            post_repo,
            project_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Published posts, filtered and ordered per the query.
    pub async fn list_published(&self, query: &ListQuery) -> AppResult<Vec<PostSummary>> {
        let rows = self.post_repo.find_published_with_tags().await?;
        Ok(listing::apply(rows, query)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Unique tag names used by published posts.
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let rows = self.post_repo.find_published_with_tags().await?;
        Ok(listing::categories(&rows))
    }

    /// A published post by slug, trying decoded spellings when the exact slug
    /// misses.
    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<Option<PostDetail>> {
        let found = match self.post_repo.find_published_by_slug(slug).await? {
            Some(post) => Some(post),
            None => {
                let variants = slug_variants(slug);
                let post = self.post_repo.find_published_by_slugs(&variants).await?;
                if post.is_some() {
                    tracing::debug!(slug, "Resolved post through decoded slug");
                }
                post
            }
        };

        let Some(post) = found else {
            return Ok(None);
        };

        let project = match post.project_id.as_deref() {
            Some(project_id) => self
                .project_repo
                .find_by_id(project_id)
                .await?
                .filter(|p| p.status == ContentStatus::Published)
                .map(|p| ProjectLink {
                    id: p.id,
                    slug: p.slug,
                    title: p.title,
                }),
            None => None,
        };

        let tags = self.post_repo.find_tags(&post).await?;
        let content = post.content.clone();
        let content_html = folio_markdown::to_html(content.as_deref().unwrap_or_default());
        let updated_at = post.updated_at.to_rfc3339();

        Ok(Some(PostDetail {
            post: (post, tags).into(),
            content,
            content_html,
            project,
            updated_at,
        }))
    }

    /// Every post of any status, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<PostSummary>> {
        let rows = self.post_repo.find_all_with_tags().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A post with the tag ids its edit form needs.
    pub async fn get_for_edit(&self, id: &str) -> AppResult<PostEdit> {
        let post = self.post_repo.get_by_id(id).await?;
        let tags = self.post_repo.find_tags(&post).await?;
        let tag_ids = tags.iter().map(|t| t.id.clone()).collect();
        let content = post.content.clone();
        let updated_at = post.updated_at.to_rfc3339();

        Ok(PostEdit {
            post: (post, tags).into(),
            content,
            tag_ids,
            updated_at,
        })
    }

    /// Create a post from the admin form.
    pub async fn create(&self, form: PostForm) -> AppResult<post::Model> {
        let fields = form.parse()?;
        let now = Utc::now().fixed_offset();

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            slug: Set(fields.slug),
            title: Set(fields.title),
            excerpt: Set(fields.excerpt),
            content: Set(fields.content),
            cover_image: Set(fields.cover_image),
            reading_time_minutes: Set(fields.reading_time_minutes),
            status: Set(fields.status),
            published_at: Set(resolve_published_at(fields.status, None, now)),
            project_id: Set(fields.project_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let post = self.post_repo.create_with_tags(model, fields.tag_ids).await?;

        tracing::info!(
            post_id = %post.id,
            slug = %post.slug,
            status = %post.status,
            "Created post"
        );
        self.cache.revalidate(BLOG_ROUTE).await;
        Ok(post)
    }

    /// Replace a post's fields from the admin form.
    pub async fn update(&self, id: &str, form: PostForm) -> AppResult<post::Model> {
        let fields = form.parse()?;
        let existing = self.post_repo.get_by_id(id).await?;
        let now = Utc::now().fixed_offset();
        let published_at = resolve_published_at(fields.status, existing.published_at, now);

        let mut model: post::ActiveModel = existing.into();
        model.slug = Set(fields.slug);
        model.title = Set(fields.title);
        model.excerpt = Set(fields.excerpt);
        model.content = Set(fields.content);
        model.cover_image = Set(fields.cover_image);
        model.reading_time_minutes = Set(fields.reading_time_minutes);
        model.status = Set(fields.status);
        model.published_at = Set(published_at);
        model.project_id = Set(fields.project_id);
        model.updated_at = Set(now);

        let post = self.post_repo.update_with_tags(model, fields.tag_ids).await?;

        tracing::info!(post_id = %post.id, status = %post.status, "Updated post");
        self.cache.revalidate(BLOG_ROUTE).await;
        Ok(post)
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.post_repo.delete(id).await?;
        tracing::info!(post_id = %id, "Deleted post");
        self.cache.revalidate(BLOG_ROUTE).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use folio_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_post(id: &str, published_days_ago: Option<i64>) -> post::Model {
        let now = Utc::now().fixed_offset();
        post::Model {
            id: id.to_string(),
            slug: format!("post-{id}"),
            title: format!("Post {id}"),
            excerpt: "Excerpt".to_string(),
            content: Some("Some words".to_string()),
            cover_image: None,
            reading_time_minutes: Some(1),
            status: if published_days_ago.is_some() {
                ContentStatus::Published
            } else {
                ContentStatus::Draft
            },
            published_at: published_days_ago.map(|d| now - Duration::days(d)),
            project_id: None,
            created_at: now - Duration::days(10),
            updated_at: now - Duration::days(10),
        }
    }

    fn service(db: sea_orm::DatabaseConnection, cache: RouteCache) -> PostService {
        let db = Arc::new(db);
        PostService::new(
            PostRepository::new(db.clone()),
            ProjectRepository::new(db),
            cache,
        )
    }

    fn form(status: &str) -> PostForm {
        PostForm {
            title: Some("Hello".into()),
            slug: Some("hello".into()),
            excerpt: Some("Hi".into()),
            content: Some("word ".repeat(450)),
            cover_image: Some(String::new()),
            reading_time_minutes: Some(String::new()),
            status: Some(status.into()),
            project_id: Some(String::new()),
            tags: None,
        }
    }

    #[test]
    fn test_form_estimates_reading_time() {
        let fields = form("draft").parse().unwrap();
        assert_eq!(fields.reading_time_minutes, Some(3));
        assert_eq!(fields.project_id, None);
        assert_eq!(fields.cover_image, None);
    }

    #[test]
    fn test_form_explicit_reading_time_wins() {
        let fields = PostForm {
            reading_time_minutes: Some("12".into()),
            ..form("draft")
        }
        .parse()
        .unwrap();
        assert_eq!(fields.reading_time_minutes, Some(12));
    }

    #[test]
    fn test_form_derives_missing_excerpt() {
        let fields = PostForm {
            excerpt: Some("  ".into()),
            ..form("draft")
        }
        .parse()
        .unwrap();
        assert!(fields.excerpt.starts_with("word word"));
        assert!(fields.excerpt.chars().count() <= EXCERPT_CHARS + 1);
    }

    #[test]
    fn test_form_rejects_non_numeric_reading_time() {
        let result = PostForm {
            reading_time_minutes: Some("soon".into()),
            ..form("draft")
        }
        .parse();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_publishes_without_prior_timestamp() {
        let existing = create_test_post("p1", None);
        let mut updated = existing.clone();
        updated.status = ContentStatus::Published;
        updated.published_at = Some(Utc::now().fixed_offset());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .append_query_results([[updated]])
            .into_connection();

        let cache = RouteCache::new(std::time::Duration::from_secs(60));
        cache.insert("/blog", json!([])).await;
        cache.insert("/projects", json!([])).await;

        let post = service(db, cache.clone())
            .update("p1", form("published"))
            .await
            .unwrap();

        assert_eq!(post.status, ContentStatus::Published);
        assert!(post.published_at.is_some());
        assert_eq!(cache.get("/blog").await, None);
        assert!(cache.get("/projects").await.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let err = service(db, RouteCache::disabled())
            .update("missing", form("draft"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = PostSummary::from((create_test_post("p1", Some(2)), vec![]));
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["readingTimeMinutes"], 1);
        assert_eq!(value["status"], "published");
        assert!(value["publishedAt"].is_string());
    }
}
