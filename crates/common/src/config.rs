//! Application configuration.

use serde::Deserialize;
use std::path::Path;

use crate::storage::StorageConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Image storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Public route cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Upload limits.
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Admin account created at start-up when missing.
    #[serde(default)]
    pub admin: Option<AdminBootstrapConfig>,
    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the site.
    pub url: String,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Whether the session cookie is marked `Secure`.
    #[serde(default = "default_true")]
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            secure_cookie: true,
        }
    }
}

/// Route cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached public response stays fresh. Zero disables caching.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted image size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Credentials of the admin account ensured at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminBootstrapConfig {
    /// Login email.
    pub email: String,
    /// Plain-text password, hashed before it is stored.
    pub password: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_session_ttl_hours() -> i64 {
    24 * 7
}

const fn default_cache_ttl_secs() -> u64 {
    300
}

const fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `FOLIO_ENV`)
    /// 4. Environment variables with `FOLIO__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let env = std::env::var("FOLIO_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            r#"
[server]
url = "https://folio.example"

[database]
url = "postgres://localhost/folio"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.auth.session_ttl_hours, 168);
        assert!(config.admin.is_none());
        assert!(!config.log.json);
        assert!(matches!(config.storage, StorageConfig::Local { .. }));
    }

    #[test]
    fn test_from_file_reads_storage_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            r#"
[server]
url = "https://folio.example"

[database]
url = "postgres://localhost/folio"

[storage]
backend = "local"
base_path = "/var/lib/folio/files"
base_url = "https://folio.example/files"

[admin]
email = "me@folio.example"
password = "correct horse battery staple"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        match config.storage {
            StorageConfig::Local { base_path, base_url } => {
                assert_eq!(base_path.to_str(), Some("/var/lib/folio/files"));
                assert_eq!(base_url, "https://folio.example/files");
            }
            StorageConfig::S3 { .. } => panic!("expected local storage"),
        }
        assert_eq!(config.admin.unwrap().email, "me@folio.example");
    }
}
