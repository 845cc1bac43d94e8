//! Public tag endpoint.

use axum::{Router, extract::State, routing::get};
use folio_core::tag::TAGS_ROUTE;
use serde_json::Value;

use super::cached_list;
use crate::{middleware::AppState, response::ApiResponse};

/// All tags ordered by name.
async fn list(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::ok(cached_list(&state.cache, TAGS_ROUTE.to_string(), state.tag_service.list()).await)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
