//! Public contact form.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::post,
};
use folio_common::AppError;
use folio_core::ContactInput;
use serde::Serialize;

use crate::{
    extractors::RequestLang,
    middleware::AppState,
    rate_limit::rate_limit_contact_middleware,
    response::{FlatError, FlatResult},
};

#[derive(Serialize)]
struct ContactSent {
    success: bool,
    message: String,
}

/// Store a contact message. Errors are reported in the visitor's language.
async fn submit(
    State(state): State<AppState>,
    RequestLang(lang): RequestLang,
    payload: Result<Json<ContactInput>, JsonRejection>,
) -> FlatResult<Json<ContactSent>> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected contact payload");
        FlatError::new(StatusCode::BAD_REQUEST, lang.text("contact.invalid"))
    })?;

    match state.contact_service.submit(input).await {
        Ok(_) => Ok(Json(ContactSent {
            success: true,
            message: lang.text("contact.success").to_string(),
        })),
        Err(AppError::Validation(detail)) => {
            tracing::debug!(%detail, "Incomplete contact submission");
            Err(FlatError::new(
                StatusCode::BAD_REQUEST,
                lang.text("contact.required"),
            ))
        }
        Err(e) => {
            e.log();
            Err(FlatError::new(e.status_code(), lang.text("contact.error")))
        }
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/",
        post(submit).route_layer(from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_contact_middleware,
        )),
    )
}
