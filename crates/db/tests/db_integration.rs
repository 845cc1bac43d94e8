//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `folio_test`)
//!   `TEST_DB_PASSWORD` (default: `folio_test`)
//!   `TEST_DB_NAME` (default: `folio_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use folio_common::{AppError, IdGenerator};
use folio_db::entities::{
    AdminSession, AdminUser, Contact, ContentStatus, Post, PostTag, Project, ProjectImage,
    ProjectTag, Tag, post, project, project_image, tag,
};
use folio_db::repositories::{PostRepository, ProjectRepository, TagRepository};
use folio_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityName, EntityTrait, PaginatorTrait,
    QueryFilter, Set, Statement,
};

fn new_project(slug: &str, status: ContentStatus) -> project::ActiveModel {
    let now = Utc::now().fixed_offset();
    project::ActiveModel {
        id: Set(IdGenerator::new().generate()),
        slug: Set(slug.to_string()),
        title: Set(format!("Project {slug}")),
        short_description: Set("A project".to_string()),
        content: Set(Some("# Hello".to_string())),
        cover_image: Set(None),
        github_url: Set(None),
        demo_url: Set(None),
        featured: Set(false),
        status: Set(status),
        published_at: Set((status == ContentStatus::Published).then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

async fn create_tags(repo: &TagRepository, names: &[&str]) -> Vec<String> {
    let mut ids = Vec::new();
    for name in names {
        let tag = repo
            .create(tag::ActiveModel {
                id: Set(IdGenerator::new().generate()),
                name: Set((*name).to_string()),
                slug: Set(name.to_lowercase()),
                icon_path: Set(None),
            })
            .await
            .unwrap();
        ids.push(tag.id);
    }
    ids
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_create_entity_tables() {
    let db = TestDatabase::create_unique().await.unwrap();

    let rows = db
        .connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT tablename FROM pg_tables WHERE schemaname = 'public'".to_string(),
        ))
        .await
        .unwrap();
    let tables: Vec<String> = rows
        .iter()
        .map(|row| row.try_get::<String>("", "tablename").unwrap())
        .collect();

    for expected in [
        Tag.table_name(),
        Project.table_name(),
        ProjectTag.table_name(),
        ProjectImage.table_name(),
        Post.table_name(),
        PostTag.table_name(),
        Contact.table_name(),
        AdminUser.table_name(),
        AdminSession.table_name(),
    ] {
        assert!(
            tables.iter().any(|t| t == expected),
            "missing table {expected}, found {tables:?}"
        );
    }

    let indexes = db
        .connection()
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT indexdef FROM pg_indexes WHERE indexname IN \
             ('idx_project_status_published_at', 'idx_post_status_published_at')"
                .to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(indexes.len(), 2);
    for row in &indexes {
        let def = row.try_get::<String>("", "indexdef").unwrap();
        assert!(def.contains("status, published_at"), "{def}");
    }

    let tags = TagRepository::new(db.shared());
    assert!(tags.find_all().await.unwrap().is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_unknown_status_is_rejected() {
    let db = TestDatabase::create_unique().await.unwrap();

    let insert = format!(
        "INSERT INTO \"{}\" (id, slug, title, short_description, status, created_at, updated_at) \
         VALUES ('p1', 'bad', 'Bad', 'x', 'live', now(), now())",
        Project.table_name()
    );
    assert!(
        db.connection()
            .execute(Statement::from_string(DatabaseBackend::Postgres, insert))
            .await
            .is_err()
    );

    let valid = format!(
        "INSERT INTO \"{}\" (id, slug, title, short_description, status, created_at, updated_at) \
         VALUES ('p2', 'good', 'Good', 'x', 'archived', now(), now())",
        Project.table_name()
    );
    db.connection()
        .execute(Statement::from_string(DatabaseBackend::Postgres, valid))
        .await
        .unwrap();

    let insert = format!(
        "INSERT INTO \"{}\" (id, slug, title, excerpt, status, created_at, updated_at) \
         VALUES ('b1', 'bad', 'Bad', 'x', 'live', now(), now())",
        Post.table_name()
    );
    assert!(
        db.connection()
            .execute(Statement::from_string(DatabaseBackend::Postgres, insert))
            .await
            .is_err()
    );

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_project_tag_links_are_replaced() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.shared();
    let projects = ProjectRepository::new(conn.clone());
    let tags = TagRepository::new(conn.clone());

    let tag_ids = create_tags(&tags, &["Rust", "Axum", "Postgres"]).await;

    let mut desired = tag_ids.clone();
    desired.push(tag_ids[0].clone());
    let created = projects
        .create_with_associations(
            new_project("folio", ContentStatus::Draft),
            Some(desired),
            None,
        )
        .await
        .unwrap();

    let links = ProjectTag::find()
        .filter(folio_db::entities::project_tag::Column::ProjectId.eq(&created.id))
        .count(conn.as_ref())
        .await
        .unwrap();
    assert_eq!(links, 3);

    let mut update: project::ActiveModel = created.clone().into();
    update.title = Set("Folio".to_string());
    projects
        .update_with_associations(update, Some(vec![tag_ids[2].clone()]), None)
        .await
        .unwrap();

    assert_eq!(
        projects.find_tag_ids(&created.id).await.unwrap(),
        vec![tag_ids[2].clone()]
    );

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_gallery_images_are_rewritten_in_order() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.shared();
    let projects = ProjectRepository::new(conn);

    let model = new_project("gallery", ContentStatus::Published);
    let project_id = match &model.id {
        sea_orm::ActiveValue::Set(id) => id.clone(),
        _ => unreachable!(),
    };
    let images = |urls: &[&str]| {
        urls.iter()
            .enumerate()
            .map(|(i, url)| project_image::ActiveModel {
                id: Set(IdGenerator::new().generate()),
                project_id: Set(project_id.clone()),
                url: Set((*url).to_string()),
                display_order: Set(i32::try_from(i).unwrap()),
                created_at: Set(Utc::now().fixed_offset()),
            })
            .collect::<Vec<_>>()
    };

    let created = projects
        .create_with_associations(model, None, Some(images(&["/a.png", "/b.png"])))
        .await
        .unwrap();

    let update: project::ActiveModel = created.clone().into();
    projects
        .update_with_associations(update, None, Some(images(&["/c.png"])))
        .await
        .unwrap();

    let stored = projects.find_images(&created.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].url, "/c.png");
    assert_eq!(stored[0].display_order, 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_tag_keeps_content() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.shared();
    let projects = ProjectRepository::new(conn.clone());
    let posts = PostRepository::new(conn.clone());
    let tags = TagRepository::new(conn.clone());

    let tag_ids = create_tags(&tags, &["Rust"]).await;
    let project = projects
        .create_with_associations(
            new_project("kept", ContentStatus::Published),
            Some(tag_ids.clone()),
            None,
        )
        .await
        .unwrap();

    let now = Utc::now().fixed_offset();
    let post = posts
        .create_with_tags(
            post::ActiveModel {
                id: Set(IdGenerator::new().generate()),
                slug: Set("hello".to_string()),
                title: Set("Hello".to_string()),
                excerpt: Set("Hi".to_string()),
                content: Set(None),
                cover_image: Set(None),
                reading_time_minutes: Set(Some(1)),
                status: Set(ContentStatus::Published),
                published_at: Set(Some(now)),
                project_id: Set(Some(project.id.clone())),
                created_at: Set(now),
                updated_at: Set(now),
            },
            Some(tag_ids.clone()),
        )
        .await
        .unwrap();

    tags.delete(&tag_ids[0]).await.unwrap();

    assert!(projects.find_by_id(&project.id).await.unwrap().is_some());
    assert!(posts.find_by_id(&post.id).await.unwrap().is_some());
    assert_eq!(PostTag::find().count(conn.as_ref()).await.unwrap(), 0);
    assert_eq!(ProjectTag::find().count(conn.as_ref()).await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_slug_lookup_is_published_only() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = db.shared();
    let projects = ProjectRepository::new(conn);

    projects
        .create_with_associations(new_project("live", ContentStatus::Published), None, None)
        .await
        .unwrap();
    projects
        .create_with_associations(new_project("wip", ContentStatus::Draft), None, None)
        .await
        .unwrap();
    projects
        .create_with_associations(
            new_project("café crème", ContentStatus::Published),
            None,
            None,
        )
        .await
        .unwrap();

    assert!(projects.find_published_by_slug("live").await.unwrap().is_some());
    assert!(projects.find_published_by_slug("wip").await.unwrap().is_none());
    assert!(projects.find_published_by_slug("missing").await.unwrap().is_none());

    let found = projects
        .find_published_by_slugs(&["café crème".to_string()])
        .await
        .unwrap();
    assert_eq!(found.unwrap().slug, "café crème");

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_slug_is_conflict() {
    let db = TestDatabase::create_unique().await.unwrap();
    let projects = ProjectRepository::new(db.shared());

    projects
        .create_with_associations(new_project("twin", ContentStatus::Draft), None, None)
        .await
        .unwrap();
    let err = projects
        .create_with_associations(new_project("twin", ContentStatus::Draft), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_failed_tag_sync_rolls_back_project() {
    let db = TestDatabase::create_unique().await.unwrap();
    let projects = ProjectRepository::new(db.shared());

    let err = projects
        .create_with_associations(
            new_project("orphan", ContentStatus::Draft),
            Some(vec!["no-such-tag".to_string()]),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(projects.count().await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}
