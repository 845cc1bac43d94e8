//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use folio_common::AppError;
use folio_core::{Lang, SessionInfo};

/// Authenticated admin extractor.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionInfo);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<SessionInfo>()
            .cloned()
            .map(AdminSession)
            .ok_or(AppError::Unauthorized)
    }
}

/// Language requested via `?lang=` or `Accept-Language`, defaulting to Spanish.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLang(pub Lang);

impl<S> FromRequestParts<S> for RequestLang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "lang")
                .and_then(|(_, value)| Lang::from_code(&value))
        });

        let lang = from_query
            .or_else(|| {
                parts
                    .headers
                    .get(header::ACCEPT_LANGUAGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(Lang::from_accept_language)
            })
            .unwrap_or_default();

        Ok(Self(lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn lang_of(req: Request<()>) -> Lang {
        let (mut parts, ()) = req.into_parts();
        let RequestLang(lang) = RequestLang::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        lang
    }

    #[tokio::test]
    async fn test_query_wins_over_header() {
        let req = Request::builder()
            .uri("/api/contact?lang=en")
            .header(header::ACCEPT_LANGUAGE, "es-ES,es;q=0.9")
            .body(())
            .unwrap();
        assert_eq!(lang_of(req).await, Lang::En);
    }

    #[tokio::test]
    async fn test_accept_language_used_without_query() {
        let req = Request::builder()
            .uri("/api/contact")
            .header(header::ACCEPT_LANGUAGE, "en-GB,en;q=0.8")
            .body(())
            .unwrap();
        assert_eq!(lang_of(req).await, Lang::En);
    }

    #[tokio::test]
    async fn test_defaults_to_spanish() {
        let req = Request::builder()
            .uri("/api/contact?lang=fr")
            .body(())
            .unwrap();
        assert_eq!(lang_of(req).await, Lang::Es);
    }
}
