//! Liveness endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde_json::{Value, json};

use crate::middleware::AppState;

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "version": env!("CARGO_PKG_VERSION") })),
            )
        }
    }
}

/// `GET /health`, mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
