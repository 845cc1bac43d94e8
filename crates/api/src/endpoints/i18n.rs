//! Translation tables for the language toggle.

use axum::{
    Json, Router,
    extract::Path,
    routing::get,
};
use folio_core::Lang;
use serde::Serialize;
use serde_json::Value;

use crate::{extractors::RequestLang, middleware::AppState};

#[derive(Serialize)]
struct TranslationResponse {
    lang: Lang,
    messages: &'static Value,
}

impl From<Lang> for TranslationResponse {
    fn from(lang: Lang) -> Self {
        Self {
            lang,
            messages: lang.table(),
        }
    }
}

/// Table for the language negotiated from the request.
async fn negotiated(RequestLang(lang): RequestLang) -> Json<TranslationResponse> {
    Json(lang.into())
}

/// Table for an explicit language. Unknown codes fall back to Spanish.
async fn by_code(Path(code): Path<String>) -> Json<TranslationResponse> {
    Json(Lang::from_code(&code).unwrap_or_default().into())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(negotiated))
        .route("/{lang}", get(by_code))
}
