//! Project service.

use chrono::Utc;
use folio_common::{AppResult, IdGenerator};
use folio_db::entities::{ContentStatus, project, project_image, tag};
use folio_db::repositories::ProjectRepository;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::cache::RouteCache;
use super::forms::{
    non_empty, parse_flag, parse_id_list, parse_status, required, required_slug,
    resolve_published_at, slug_variants,
};
use super::listing::{self, ListQuery};
use super::post::BLOG_ROUTE;
use super::tag::TagResponse;

/// Public route prefix for projects.
pub const PROJECTS_ROUTE: &str = "/projects";

/// Routes whose output embeds project data. Post details link their project.
const PROJECT_ROUTES: [&str; 2] = [PROJECTS_ROUTE, BLOG_ROUTE];

/// Admin project form.
///
/// `tags` and `gallery_images` carry JSON arrays of tag ids and image URLs.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
    pub featured: Option<String>,
    pub tags: Option<String>,
    pub gallery_images: Option<String>,
}

#[derive(Debug)]
struct ProjectFields {
    title: String,
    slug: String,
    short_description: String,
    content: Option<String>,
    github_url: Option<String>,
    demo_url: Option<String>,
    cover_image: Option<String>,
    status: ContentStatus,
    featured: bool,
    tag_ids: Option<Vec<String>>,
    gallery_images: Option<Vec<String>>,
}

impl ProjectForm {
    fn parse(self) -> AppResult<ProjectFields> {
        Ok(ProjectFields {
            title: required(self.title, "Title")?,
            slug: required_slug(self.slug)?,
            short_description: non_empty(self.short_description).unwrap_or_default(),
            content: non_empty(self.content),
            github_url: non_empty(self.github_url),
            demo_url: non_empty(self.demo_url),
            cover_image: non_empty(self.cover_image),
            status: parse_status(self.status.as_deref())?,
            featured: parse_flag(self.featured.as_deref()),
            tag_ids: parse_id_list(self.tags.as_deref(), "tags"),
            gallery_images: parse_id_list(self.gallery_images.as_deref(), "gallery_images"),
        })
    }
}

/// Project as shown in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub cover_image: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: bool,
    pub status: ContentStatus,
    pub published_at: Option<String>,
    pub created_at: String,
    pub tags: Vec<TagResponse>,
}

impl From<(project::Model, Vec<tag::Model>)> for ProjectSummary {
    fn from((p, tags): (project::Model, Vec<tag::Model>)) -> Self {
        Self {
            id: p.id,
            slug: p.slug,
            title: p.title,
            short_description: p.short_description,
            cover_image: p.cover_image,
            github_url: p.github_url,
            demo_url: p.demo_url,
            featured: p.featured,
            status: p.status,
            published_at: p.published_at.map(|t| t.to_rfc3339()),
            created_at: p.created_at.to_rfc3339(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Project case study page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectSummary,
    pub content: Option<String>,
    pub content_html: String,
    pub reading_time_minutes: i32,
    /// Cover image followed by the gallery, in display order.
    pub gallery: Vec<String>,
    pub updated_at: String,
}

/// Project as loaded into the admin edit form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEdit {
    #[serde(flatten)]
    pub project: ProjectSummary,
    pub content: Option<String>,
    pub tag_ids: Vec<String>,
    pub gallery_images: Vec<String>,
    pub updated_at: String,
}

/// Service for managing projects.
#[derive(Clone)]
pub struct ProjectService {
    project_repo: ProjectRepository,
    cache: RouteCache,
    id_gen: IdGenerator,
}

impl ProjectService {
    /// Create a new project service.
    #[must_use]
    pub const fn new(project_repo: ProjectRepository, cache: RouteCache) -> Self {
        Self {
            project_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Published projects, filtered and ordered per the query.
    pub async fn list_published(&self, query: &ListQuery) -> AppResult<Vec<ProjectSummary>> {
        let rows = self.project_repo.find_published_with_tags().await?;
        Ok(listing::apply(rows, query)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// A published project by slug, trying decoded spellings when the exact
    /// slug misses.
    pub async fn get_published_by_slug(&self, slug: &str) -> AppResult<Option<ProjectDetail>> {
        let found = match self.project_repo.find_published_by_slug(slug).await? {
            Some(project) => Some(project),
            None => {
                let variants = slug_variants(slug);
                let project = self.project_repo.find_published_by_slugs(&variants).await?;
                if project.is_some() {
                    tracing::debug!(slug, "Resolved project through decoded slug");
                }
                project
            }
        };

        let Some(project) = found else {
            return Ok(None);
        };

        let tags = self.project_repo.find_tags(&project).await?;
        let images = self.project_repo.find_images(&project.id).await?;

        let markdown = project.content.clone().unwrap_or_default();
        let gallery = project
            .cover_image
            .iter()
            .cloned()
            .chain(images.into_iter().map(|image| image.url))
            .filter(|url| !url.trim().is_empty())
            .collect();
        let updated_at = project.updated_at.to_rfc3339();
        let content = project.content.clone();

        Ok(Some(ProjectDetail {
            project: (project, tags).into(),
            content,
            content_html: folio_markdown::to_html(&markdown),
            reading_time_minutes: folio_markdown::reading_time_minutes(&markdown),
            gallery,
            updated_at,
        }))
    }

    /// Every project of any status, newest first.
    pub async fn list_all(&self) -> AppResult<Vec<ProjectSummary>> {
        let rows = self.project_repo.find_all_with_tags().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// A project with the tag ids and gallery URLs its edit form needs.
    pub async fn get_for_edit(&self, id: &str) -> AppResult<ProjectEdit> {
        let project = self.project_repo.get_by_id(id).await?;
        let tags = self.project_repo.find_tags(&project).await?;
        let tag_ids = tags.iter().map(|t| t.id.clone()).collect();
        let gallery_images = self
            .project_repo
            .find_images(&project.id)
            .await?
            .into_iter()
            .map(|image| image.url)
            .collect();
        let content = project.content.clone();
        let updated_at = project.updated_at.to_rfc3339();

        Ok(ProjectEdit {
            project: (project, tags).into(),
            content,
            tag_ids,
            gallery_images,
            updated_at,
        })
    }

    /// Create a project from the admin form.
    pub async fn create(&self, form: ProjectForm) -> AppResult<project::Model> {
        let fields = form.parse()?;
        let now = Utc::now().fixed_offset();
        let id = self.id_gen.generate();

        let images = fields
            .gallery_images
            .map(|urls| self.image_models(&id, urls));

        let model = project::ActiveModel {
            id: Set(id),
            slug: Set(fields.slug),
            title: Set(fields.title),
            short_description: Set(fields.short_description),
            content: Set(fields.content),
            cover_image: Set(fields.cover_image),
            github_url: Set(fields.github_url),
            demo_url: Set(fields.demo_url),
            featured: Set(fields.featured),
            status: Set(fields.status),
            published_at: Set(resolve_published_at(fields.status, None, now)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let project = self
            .project_repo
            .create_with_associations(model, fields.tag_ids, images)
            .await?;

        tracing::info!(
            project_id = %project.id,
            slug = %project.slug,
            status = %project.status,
            "Created project"
        );
        self.revalidate().await;
        Ok(project)
    }

    /// Replace a project's fields from the admin form.
    ///
    /// Tag links and gallery images change only when the form carries them.
    pub async fn update(&self, id: &str, form: ProjectForm) -> AppResult<project::Model> {
        let fields = form.parse()?;
        let existing = self.project_repo.get_by_id(id).await?;
        let now = Utc::now().fixed_offset();

        let published_at = resolve_published_at(fields.status, existing.published_at, now);
        let images = fields
            .gallery_images
            .map(|urls| self.image_models(&existing.id, urls));

        let mut model: project::ActiveModel = existing.into();
        model.slug = Set(fields.slug);
        model.title = Set(fields.title);
        model.short_description = Set(fields.short_description);
        model.content = Set(fields.content);
        model.cover_image = Set(fields.cover_image);
        model.github_url = Set(fields.github_url);
        model.demo_url = Set(fields.demo_url);
        model.featured = Set(fields.featured);
        model.status = Set(fields.status);
        model.published_at = Set(published_at);
        model.updated_at = Set(now);

        let project = self
            .project_repo
            .update_with_associations(model, fields.tag_ids, images)
            .await?;

        tracing::info!(project_id = %project.id, status = %project.status, "Updated project");
        self.revalidate().await;
        Ok(project)
    }

    /// Delete a project.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.project_repo.delete(id).await?;
        tracing::info!(project_id = %id, "Deleted project");
        self.revalidate().await;
        Ok(())
    }

    fn image_models(&self, project_id: &str, urls: Vec<String>) -> Vec<project_image::ActiveModel> {
        let now = Utc::now().fixed_offset();
        urls.into_iter()
            .enumerate()
            .map(|(index, url)| project_image::ActiveModel {
                id: Set(self.id_gen.generate()),
                project_id: Set(project_id.to_string()),
                url: Set(url),
                display_order: Set(i32::try_from(index).unwrap_or(i32::MAX)),
                created_at: Set(now),
            })
            .collect()
    }

    async fn revalidate(&self) {
        for route in PROJECT_ROUTES {
            self.cache.revalidate(route).await;
        }
    }
}
