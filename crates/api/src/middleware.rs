//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use folio_common::{AppError, Config, StorageService};
use folio_core::{
    AuthService, ContactService, DashboardService, PostService, ProjectService, RouteCache,
    SessionInfo, TagService, UploadService,
};
use folio_db::repositories::{
    AdminRepository, ContactRepository, PostRepository, ProjectRepository, TagRepository,
};
use sea_orm::DatabaseConnection;

use crate::rate_limit::ApiRateLimiter;

/// Name of the cookie holding the admin session token.
pub const SESSION_COOKIE: &str = "folio_session";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub project_service: ProjectService,
    pub post_service: PostService,
    pub tag_service: TagService,
    pub contact_service: ContactService,
    pub dashboard_service: DashboardService,
    pub auth_service: AuthService,
    pub upload_service: UploadService,
    pub cache: RouteCache,
    pub rate_limiter: ApiRateLimiter,
    pub secure_cookie: bool,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, storage: StorageService, config: &Config) -> Self {
        let cache = if config.cache.ttl_secs == 0 {
            RouteCache::disabled()
        } else {
            RouteCache::new(Duration::from_secs(config.cache.ttl_secs))
        };

        let project_repo = ProjectRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let contact_repo = ContactRepository::new(Arc::clone(&db));
        let admin_repo = AdminRepository::new(Arc::clone(&db));

        Self {
            project_service: ProjectService::new(project_repo.clone(), cache.clone()),
            post_service: PostService::new(post_repo.clone(), project_repo.clone(), cache.clone()),
            tag_service: TagService::new(tag_repo.clone(), cache.clone()),
            contact_service: ContactService::new(contact_repo.clone()),
            dashboard_service: DashboardService::new(
                project_repo,
                post_repo,
                tag_repo,
                contact_repo,
            ),
            auth_service: AuthService::new(admin_repo, config.auth.session_ttl_hours),
            upload_service: UploadService::new(storage, config.uploads.max_bytes),
            cache,
            rate_limiter: ApiRateLimiter::new(),
            secure_cookie: config.auth.secure_cookie,
            db,
        }
    }
}

/// Session token sent as `Authorization: Bearer` or in the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// Resolves the session token to a [`SessionInfo`] stored in the request
/// extensions. Requests without a valid session pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = session_token(req.headers()) {
        match state.auth_service.authenticate(&token).await {
            Ok(Some(session)) => {
                req.extensions_mut().insert(session);
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired session token"),
            Err(e) => e.log(),
        }
    }

    next.run(req).await
}

/// Reject requests that carry no admin session.
pub async fn require_admin(req: Request<Body>, next: Next) -> Response {
    if req.extensions().get::<SessionInfo>().is_none() {
        return AppError::Unauthorized.into_response();
    }

    next.run(req).await
}
