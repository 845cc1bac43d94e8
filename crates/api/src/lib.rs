//! HTTP API layer for folio.
//!
//! This crate provides the JSON API consumed by the public site and the admin
//! back office:
//!
//! - **Endpoints**: public portfolio/blog reads, contact form, admin CRUD
//! - **Extractors**: admin session, request language
//! - **Middleware**: session resolution, per-IP rate limiting
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig};

/// Build the complete application: `/api/*`, `/health`, and session resolution.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", endpoints::router(&state))
        .merge(endpoints::health::router())
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}
