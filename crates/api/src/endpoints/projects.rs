//! Public project endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use folio_common::AppResult;
use folio_core::{ListQuery, project::PROJECTS_ROUTE};
use serde_json::Value;

use super::{cached_detail, cached_list};
use crate::{middleware::AppState, response::ApiResponse};

/// Published projects, newest first unless `sort=oldest`.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResponse<Value> {
    let key = query.cache_key(PROJECTS_ROUTE);
    ApiResponse::ok(
        cached_list(
            &state.cache,
            key,
            state.project_service.list_published(&query),
        )
        .await,
    )
}

/// A published project with rendered content and gallery.
async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let key = format!("{PROJECTS_ROUTE}/{slug}");
    let project = cached_detail(
        &state.cache,
        key,
        state.project_service.get_published_by_slug(&slug),
    )
    .await?;

    Ok(ApiResponse::ok(project))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(show))
}

