//! API endpoints.

mod admin;
mod auth;
mod contact;
pub mod health;
mod i18n;
mod posts;
mod projects;
mod tags;

use std::future::Future;

use axum::Router;
use folio_common::{AppError, AppResult};
use folio_core::RouteCache;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::AppState;

/// Create the API router, mounted under `/api`.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/projects", projects::router())
        .nest("/posts", posts::router())
        .nest("/tags", tags::router())
        .nest("/i18n", i18n::router())
        .nest("/contact", contact::router(state))
        .nest("/auth", auth::router(state))
        .nest("/admin", admin::router(state))
}

/// Serve a public list from the route cache, loading it on a miss.
///
/// A failed load is logged and rendered as an empty list; it is never cached.
async fn cached_list<T, F>(cache: &RouteCache, key: String, load: F) -> Value
where
    T: Serialize,
    F: Future<Output = AppResult<Vec<T>>>,
{
    if let Some(hit) = cache.get(&key).await {
        return hit;
    }

    let loaded = load.await.and_then(|items| to_value(&items));
    match loaded {
        Ok(value) => {
            cache.insert(key, value.clone()).await;
            value
        }
        Err(e) => {
            tracing::warn!(error = %e, route = %key, "Serving empty list after load failure");
            Value::Array(Vec::new())
        }
    }
}

/// Serve a public detail view from the route cache.
///
/// Missing entries and failed loads both end as `NotFound`.
async fn cached_detail<T, F>(cache: &RouteCache, key: String, load: F) -> AppResult<Value>
where
    T: Serialize,
    F: Future<Output = AppResult<Option<T>>>,
{
    if let Some(hit) = cache.get(&key).await {
        return Ok(hit);
    }

    let found = match load.await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, route = %key, "Detail lookup failed");
            None
        }
    };

    let Some(item) = found else {
        return Err(AppError::NotFound(key));
    };

    let value = to_value(&item)?;
    cache.insert(key, value.clone()).await;
    Ok(value)
}

fn to_value<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_failed_list_is_empty_and_not_cached() {
        let cache = RouteCache::new(Duration::from_secs(60));
        let value = cached_list::<String, _>(&cache, "/blog".to_string(), async {
            Err(AppError::Database("down".into()))
        })
        .await;

        assert_eq!(value, Value::Array(Vec::new()));
        assert!(cache.get("/blog").await.is_none());
    }

    #[tokio::test]
    async fn test_list_served_from_cache() {
        let cache = RouteCache::new(Duration::from_secs(60));
        cached_list(&cache, "/tags".to_string(), async { Ok(vec!["rust"]) }).await;

        let value = cached_list::<String, _>(&cache, "/tags".to_string(), async {
            Err(AppError::Database("not reached".into()))
        })
        .await;
        assert_eq!(value, serde_json::json!(["rust"]));
    }

    #[tokio::test]
    async fn test_missing_detail_is_not_found() {
        let cache = RouteCache::new(Duration::from_secs(60));
        let err = cached_detail::<String, _>(&cache, "/blog/nope".to_string(), async { Ok(None) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
