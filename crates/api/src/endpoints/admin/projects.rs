//! Project administration.

use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    routing::get,
};
use folio_common::AppResult;
use folio_core::{ProjectEdit, ProjectForm, ProjectSummary};

use super::form_rejected;
use crate::{
    extractors::AdminSession,
    middleware::AppState,
    response::{ApiResponse, FlatResult, MutationResponse},
};

/// Every project, drafts included, newest first.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ProjectSummary>>> {
    Ok(ApiResponse::ok(state.project_service.list_all().await?))
}

/// A project with its tag ids and gallery, for the edit form.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProjectEdit>> {
    Ok(ApiResponse::ok(state.project_service.get_for_edit(&id).await?))
}

async fn create(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    form: Result<Form<ProjectForm>, FormRejection>,
) -> FlatResult<MutationResponse> {
    let Form(form) = form.map_err(|e| form_rejected(&e))?;
    let project = state.project_service.create(form).await?;

    tracing::info!(admin = %admin.email, project_id = %project.id, "Created project");
    Ok(MutationResponse::created(project.id))
}

async fn update(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<ProjectForm>, FormRejection>,
) -> FlatResult<MutationResponse> {
    let Form(form) = form.map_err(|e| form_rejected(&e))?;
    let project = state.project_service.update(&id, form).await?;

    tracing::info!(admin = %admin.email, project_id = %project.id, "Updated project");
    Ok(MutationResponse::done(project.id))
}

async fn delete(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> FlatResult<MutationResponse> {
    state.project_service.delete(&id).await?;

    tracing::info!(admin = %admin.email, project_id = %id, "Deleted project");
    Ok(MutationResponse::done(id))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).post(update).delete(delete))
}
