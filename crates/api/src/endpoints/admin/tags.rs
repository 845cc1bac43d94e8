//! Tag administration.

use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    routing::get,
};
use folio_common::AppResult;
use folio_core::{TagForm, TagResponse};

use super::form_rejected;
use crate::{
    extractors::AdminSession,
    middleware::AppState,
    response::{ApiResponse, FlatResult, MutationResponse},
};

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagResponse>>> {
    Ok(ApiResponse::ok(state.tag_service.list().await?))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TagResponse>> {
    Ok(ApiResponse::ok(state.tag_service.get(&id).await?))
}

async fn create(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    form: Result<Form<TagForm>, FormRejection>,
) -> FlatResult<MutationResponse> {
    let Form(form) = form.map_err(|e| form_rejected(&e))?;
    let tag = state.tag_service.create(form).await?;

    tracing::info!(admin = %admin.email, tag_id = %tag.id, slug = %tag.slug, "Created tag");
    Ok(MutationResponse::created(tag.id))
}

async fn update(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<TagForm>, FormRejection>,
) -> FlatResult<MutationResponse> {
    let Form(form) = form.map_err(|e| form_rejected(&e))?;
    let tag = state.tag_service.update(&id, form).await?;

    tracing::info!(admin = %admin.email, tag_id = %tag.id, "Updated tag");
    Ok(MutationResponse::done(tag.id))
}

/// Delete a tag. Projects and posts keep existing without it.
async fn delete(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> FlatResult<MutationResponse> {
    state.tag_service.delete(&id).await?;

    tracing::info!(admin = %admin.email, tag_id = %id, "Deleted tag");
    Ok(MutationResponse::done(id))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).post(update).delete(delete))
}
