//! API rate limiting middleware.
//!
//! Per-IP fixed-window limits for the endpoints anyone can hit with a write:
//! the contact form and admin login.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

/// Rate limit configuration for an endpoint category.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Scope prefixed to the client key so categories count separately.
    pub scope: &'static str,
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Time window duration in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    pub const fn new(scope: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            scope,
            max_requests,
            window_secs,
        }
    }
}

/// Limits per endpoint category.
pub mod limits {
    use super::RateLimitConfig;

    /// Contact form submissions.
    pub const CONTACT: RateLimitConfig = RateLimitConfig::new("contact", 5, 600);

    /// Admin login attempts.
    pub const LOGIN: RateLimitConfig = RateLimitConfig::new("login", 10, 300);

    /// Longest window in use, for cleanup.
    pub const MAX_WINDOW_SECS: u64 = 600;
}

#[derive(Debug, Clone)]
struct RateLimitState {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// In-memory rate limiter.
#[derive(Clone, Default)]
pub struct ApiRateLimiter {
    states: Arc<RwLock<HashMap<String, RateLimitState>>>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(config.window_secs);

        let state = states
            .entry(format!("{}:{key}", config.scope))
            .or_insert_with(RateLimitState::new);

        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        let reset = window
            .saturating_sub(now.duration_since(state.window_start))
            .as_secs();

        if state.count >= config.max_requests {
            return RateLimitResult::Limited {
                retry_after: reset.max(1),
                limit: config.max_requests,
            };
        }

        state.count += 1;

        RateLimitResult::Allowed {
            remaining: config.max_requests.saturating_sub(state.count),
            limit: config.max_requests,
            reset,
        }
    }

    /// Drop entries whose window ended long ago.
    pub async fn cleanup(&self, max_window_secs: u64) {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let max_window = Duration::from_secs(max_window_secs * 2);

        states.retain(|_, state| now.duration_since(state.window_start) < max_window);
    }

    /// Number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

/// Rate limit check result.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    Allowed {
        remaining: u32,
        limit: u32,
        /// Seconds until window reset.
        reset: u64,
    },
    Limited {
        retry_after: u64,
        limit: u32,
    },
}

/// Rate limit error response.
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": "RATE_LIMITED",
                "message": "Too many requests",
                "retryAfter": self.retry_after
            }
        });

        (
            StatusCode::TOO_MANY_REQUESTS,
            [
                ("Retry-After", self.retry_after.to_string()),
                ("Content-Type", "application/json".to_string()),
            ],
            body.to_string(),
        )
            .into_response()
    }
}

/// Client IP as reported by the reverse proxy.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());

    forwarded.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    })
}

/// Client IP: proxy headers first, then the socket peer address.
fn client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    forwarded_ip(req.headers()).or_else(|| {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Rate limiting middleware for contact submissions.
pub async fn rate_limit_contact_middleware(
    State(limiter): State<ApiRateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    rate_limit_with_config(limiter, req, next, &limits::CONTACT).await
}

/// Rate limiting middleware for login attempts.
pub async fn rate_limit_login_middleware(
    State(limiter): State<ApiRateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    rate_limit_with_config(limiter, req, next, &limits::LOGIN).await
}

async fn rate_limit_with_config(
    limiter: ApiRateLimiter,
    req: Request<Body>,
    next: Next,
    config: &RateLimitConfig,
) -> Result<Response, RateLimitError> {
    let key = client_ip(&req).map_or_else(|| "unknown".to_string(), |ip| ip.to_string());

    match limiter.check(&key, config).await {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset,
        } => {
            let mut response = next.run(req).await;

            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", limit.into());
            headers.insert("X-RateLimit-Remaining", remaining.into());
            headers.insert("X-RateLimit-Reset", reset.into());

            Ok(response)
        }
        RateLimitResult::Limited { retry_after, .. } => {
            tracing::info!(scope = config.scope, client = %key, "Rate limit exceeded");
            Err(RateLimitError { retry_after })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new("test", 5, 60);

        for _ in 0..5 {
            assert!(matches!(
                limiter.check("10.0.0.1", &config).await,
                RateLimitResult::Allowed { .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_blocks_after_limit() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new("test", 3, 60);

        for _ in 0..3 {
            limiter.check("10.0.0.1", &config).await;
        }

        match limiter.check("10.0.0.1", &config).await {
            RateLimitResult::Limited { retry_after, .. } => assert!(retry_after > 0),
            RateLimitResult::Allowed { .. } => panic!("Expected Limited"),
        }
    }

    #[tokio::test]
    async fn test_scopes_count_separately() {
        let limiter = ApiRateLimiter::new();
        let contact = RateLimitConfig::new("contact", 1, 60);
        let login = RateLimitConfig::new("login", 1, 60);

        limiter.check("10.0.0.1", &contact).await;

        assert!(matches!(
            limiter.check("10.0.0.1", &login).await,
            RateLimitResult::Allowed { .. }
        ));
        assert_eq!(limiter.key_count().await, 2);
    }

    #[tokio::test]
    async fn test_remaining_header_values() {
        let limiter = ApiRateLimiter::new();
        let config = RateLimitConfig::new("test", 10, 60);

        match limiter.check("10.0.0.1", &config).await {
            RateLimitResult::Allowed {
                remaining,
                limit,
                reset,
            } => {
                assert_eq!(limit, 10);
                assert_eq!(remaining, 9);
                assert!(reset <= 60);
            }
            RateLimitResult::Limited { .. } => panic!("Expected Allowed"),
        }
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some("203.0.113.7".parse().unwrap()));
    }

    fn contact_request(peer: SocketAddr) -> Request<Body> {
        let mut req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    #[test]
    fn test_client_ip_falls_back_to_peer_address() {
        let req = contact_request("198.51.100.4:51000".parse().unwrap());
        assert_eq!(client_ip(&req), Some("198.51.100.4".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_direct_clients_are_limited_separately() {
        use axum::{Router, middleware::from_fn_with_state, routing::post};
        use tower::ServiceExt;

        let limiter = ApiRateLimiter::new();
        let app = Router::new()
            .route("/", post(|| async { StatusCode::OK }))
            .layer(from_fn_with_state(
                limiter.clone(),
                rate_limit_contact_middleware,
            ));

        for i in 0..limits::CONTACT.max_requests {
            let peer = format!("198.51.100.{}:40000", i + 1).parse().unwrap();
            let response = app.clone().oneshot(contact_request(peer)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .clone()
            .oneshot(contact_request("198.51.100.99:40000".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        for _ in 0..limits::CONTACT.max_requests {
            app.clone()
                .oneshot(contact_request("203.0.113.50:40000".parse().unwrap()))
                .await
                .unwrap();
        }
        let response = app
            .oneshot(contact_request("203.0.113.50:40001".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
