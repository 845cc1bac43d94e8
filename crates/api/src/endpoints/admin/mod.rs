//! Admin back office endpoints. Every route requires a session.

mod contacts;
mod posts;
mod projects;
mod tags;
mod uploads;

use axum::{
    Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use folio_common::AppResult;
use folio_core::DashboardStats;

use crate::{
    middleware::{AppState, require_admin},
    response::{ApiResponse, FlatError},
};

/// Content totals for the dashboard.
async fn dashboard(State(state): State<AppState>) -> AppResult<ApiResponse<DashboardStats>> {
    Ok(ApiResponse::ok(state.dashboard_service.stats().await?))
}

/// Turn an unreadable form body into `{"error": ...}`.
fn form_rejected(rejection: &FormRejection) -> FlatError {
    tracing::debug!(error = %rejection, "Rejected admin form");
    FlatError::new(StatusCode::BAD_REQUEST, rejection.body_text())
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .nest("/projects", projects::router())
        .nest("/posts", posts::router())
        .nest("/tags", tags::router())
        .nest("/contacts", contacts::router())
        .nest("/uploads", uploads::router(state))
        .route_layer(from_fn(require_admin))
}
