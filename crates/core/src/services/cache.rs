//! In-process cache for public route responses.
//!
//! Public pages are cached by logical route (`/projects`, `/blog/{slug}`, ...)
//! and dropped by prefix whenever an admin mutation touches the content behind
//! them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Cache of rendered public responses keyed by route.
#[derive(Clone)]
pub struct RouteCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl RouteCache {
    /// Create a cache whose entries stay fresh for `ttl`. A zero TTL disables it.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Whether entries are stored at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Fetch a fresh entry.
    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store an entry.
    pub async fn insert(&self, key: impl Into<String>, value: Value) {
        if !self.is_enabled() {
            return;
        }

        self.entries.write().await.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry for `prefix` and the routes below it.
    ///
    /// `/projects` matches `/projects`, `/projects?tag=rust` and
    /// `/projects/folio`, but not `/projects-archive`.
    pub async fn revalidate(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !route_matches(key, prefix));
        tracing::debug!(prefix, dropped = before - entries.len(), "Revalidated route cache");
    }

    /// Drop entries older than the TTL.
    pub async fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .write()
            .await
            .retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn route_matches(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = RouteCache::new(Duration::from_secs(60));
        cache.insert("/projects", json!([1, 2])).await;

        assert_eq!(cache.get("/projects").await, Some(json!([1, 2])));
        assert_eq!(cache.get("/blog").await, None);
    }

    #[tokio::test]
    async fn test_revalidate_drops_prefix_only() {
        let cache = RouteCache::new(Duration::from_secs(60));
        cache.insert("/projects", json!([])).await;
        cache.insert("/projects?tag=Rust", json!([])).await;
        cache.insert("/projects/folio", json!({})).await;
        cache.insert("/projects-archive", json!([])).await;
        cache.insert("/blog", json!([])).await;
        cache.insert("/blog/hello", json!({})).await;

        cache.revalidate("/projects").await;

        assert_eq!(cache.get("/projects").await, None);
        assert_eq!(cache.get("/projects?tag=Rust").await, None);
        assert_eq!(cache.get("/projects/folio").await, None);
        assert!(cache.get("/projects-archive").await.is_some());
        assert!(cache.get("/blog").await.is_some());
        assert!(cache.get("/blog/hello").await.is_some());
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache = RouteCache::disabled();
        cache.insert("/tags", json!([])).await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.get("/tags").await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_served() {
        let cache = RouteCache::new(Duration::from_millis(10));
        cache.insert("/tags", json!([])).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get("/tags").await, None);
        cache.purge_expired().await;
        assert_eq!(cache.len().await, 0);
    }
}
