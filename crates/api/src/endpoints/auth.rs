//! Admin authentication endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use folio_common::{AppError, AppResult};
use folio_core::{LoginInput, LoginResponse, SessionInfo};
use serde::Serialize;

use crate::{
    extractors::AdminSession,
    middleware::{AppState, SESSION_COOKIE, session_token},
    rate_limit::rate_limit_login_middleware,
    response::ApiResponse,
};

/// Log in with email and password.
///
/// The token is returned in the body and also set as an HttpOnly cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> AppResult<(CookieJar, ApiResponse<LoginResponse>)> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let session = state.auth_service.login(input).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookie)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), ApiResponse::ok(session)))
}

#[derive(Serialize)]
struct LogoutResponse {
    ok: bool,
}

/// Close the current session and clear the cookie.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, ApiResponse<LogoutResponse>)> {
    if let Some(token) = session_token(&headers) {
        state.auth_service.logout(&token).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, ApiResponse::ok(LogoutResponse { ok: true })))
}

/// The admin owning the current session.
async fn me(AdminSession(session): AdminSession) -> ApiResponse<SessionInfo> {
    ApiResponse::ok(session)
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(login).route_layer(from_fn_with_state(
                state.rate_limiter.clone(),
                rate_limit_login_middleware,
            )),
        )
        .route("/logout", post(logout))
        .route("/me", get(me))
}
