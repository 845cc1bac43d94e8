//! Public blog endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use folio_common::AppResult;
use folio_core::{ListQuery, post::BLOG_ROUTE};
use serde_json::Value;

use super::{cached_detail, cached_list};
use crate::{middleware::AppState, response::ApiResponse};

/// Published posts, filtered and ordered by the query string.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResponse<Value> {
    let key = query.cache_key(BLOG_ROUTE);
    ApiResponse::ok(cached_list(&state.cache, key, state.post_service.list_published(&query)).await)
}

/// Sorted tag names used by published posts.
async fn categories(State(state): State<AppState>) -> ApiResponse<Value> {
    let key = format!("{BLOG_ROUTE}/categories");
    ApiResponse::ok(cached_list(&state.cache, key, state.post_service.categories()).await)
}

/// A published post with rendered content.
async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<Value>> {
    let key = format!("{BLOG_ROUTE}/{slug}");
    let post = cached_detail(&state.cache, key, state.post_service.get_published_by_slug(&slug))
        .await?;

    Ok(ApiResponse::ok(post))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/categories", get(categories))
        .route("/{slug}", get(show))
}
