//! Folio server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use folio_api::{AppState, rate_limit::limits};
use folio_common::{Config, StorageConfig, build_storage};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// How often expired sessions, rate-limit windows and cache entries are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "folio=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
}

/// CORS for the configured site origins. No origins configured allows any
/// origin without credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(methods)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Route path local files are served under, taken from the storage base URL.
fn files_mount(base_url: &str) -> String {
    let path = Url::parse(base_url).map_or_else(|_| base_url.to_string(), |u| u.path().to_string());
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/files".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Periodically drop expired sessions, rate-limit windows and cache entries.
fn spawn_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;

            if let Err(e) = state.auth_service.purge_expired_sessions().await {
                e.log();
            }
            state.rate_limiter.cleanup(limits::MAX_WINDOW_SECS).await;
            state.cache.purge_expired().await;
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(config.log.json);

    info!("Starting folio server...");

    let db = folio_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    folio_db::migrate(&db).await?;
    info!("Migrations completed");

    let storage = build_storage(&config.storage)?;
    let state = AppState::new(Arc::new(db), storage, &config);

    if let Some(admin) = &config.admin {
        if state
            .auth_service
            .ensure_admin(&admin.email, &admin.password)
            .await?
        {
            info!(email = %admin.email, "Bootstrapped admin account");
        }
    }

    spawn_cleanup(state.clone());

    let mut app: Router = folio_api::app(state);

    if let StorageConfig::Local {
        base_path,
        base_url,
    } = &config.storage
    {
        let mount = files_mount(base_url);
        info!(path = %mount, dir = %base_path.display(), "Serving uploaded files");
        app = app.nest_service(&mount, ServeDir::new(base_path));
    }

    let app = app
        .layer(RequestBodyLimitLayer::new(config.uploads.max_bytes + 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins));

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_mount_from_url() {
        assert_eq!(files_mount("https://folio.example/files/"), "/files");
        assert_eq!(files_mount("/uploads"), "/uploads");
        assert_eq!(files_mount("media"), "/media");
        assert_eq!(files_mount("https://cdn.folio.example"), "/files");
    }
}
