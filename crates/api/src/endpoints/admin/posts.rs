//! Post administration.

use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    routing::get,
};
use folio_common::AppResult;
use folio_core::{PostEdit, PostForm, PostSummary};

use super::form_rejected;
use crate::{
    extractors::AdminSession,
    middleware::AppState,
    response::{ApiResponse, FlatResult, MutationResponse},
};

/// Every post, drafts included, newest first.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PostSummary>>> {
    Ok(ApiResponse::ok(state.post_service.list_all().await?))
}

/// A post with its tag ids, for the edit form.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostEdit>> {
    Ok(ApiResponse::ok(state.post_service.get_for_edit(&id).await?))
}

async fn create(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    form: Result<Form<PostForm>, FormRejection>,
) -> FlatResult<MutationResponse> {
    let Form(form) = form.map_err(|e| form_rejected(&e))?;
    let post = state.post_service.create(form).await?;

    tracing::info!(admin = %admin.email, post_id = %post.id, "Created post");
    Ok(MutationResponse::created(post.id))
}

async fn update(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<PostForm>, FormRejection>,
) -> FlatResult<MutationResponse> {
    let Form(form) = form.map_err(|e| form_rejected(&e))?;
    let post = state.post_service.update(&id, form).await?;

    tracing::info!(admin = %admin.email, post_id = %post.id, "Updated post");
    Ok(MutationResponse::done(post.id))
}

async fn delete(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> FlatResult<MutationResponse> {
    state.post_service.delete(&id).await?;

    tracing::info!(admin = %admin.email, post_id = %id, "Deleted post");
    Ok(MutationResponse::done(id))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).post(update).delete(delete))
}
