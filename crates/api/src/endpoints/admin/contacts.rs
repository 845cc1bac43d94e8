//! Contact message inbox.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use folio_common::AppResult;
use folio_core::ContactResponse;

use crate::{
    middleware::AppState,
    response::{ApiResponse, FlatResult, MutationResponse},
};

/// All messages, newest first.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ContactResponse>>> {
    Ok(ApiResponse::ok(state.contact_service.list().await?))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> FlatResult<MutationResponse> {
    state.contact_service.mark_read(&id).await?;
    Ok(MutationResponse::done(id))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> FlatResult<MutationResponse> {
    state.contact_service.delete(&id).await?;
    Ok(MutationResponse::done(id))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", delete(remove))
        .route("/{id}/read", post(mark_read))
}
