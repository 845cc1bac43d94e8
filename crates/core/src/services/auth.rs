//! Admin authentication.
//!
//! Admins log in with email and password (Argon2 hashes). A successful login
//! creates a session row keyed by the SHA-256 of a random bearer token; the
//! token itself is only ever held by the client.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use folio_common::{AppError, AppResult, IdGenerator};
use folio_db::entities::{admin_session, admin_user};
use folio_db::repositories::AdminRepository;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

/// Login request body.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// Authenticated admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: String,
    pub email: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: SessionInfo,
}

/// Service handling admin login and sessions.
#[derive(Clone)]
pub struct AuthService {
    admin_repo: AdminRepository,
    session_ttl: Duration,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service with the given session lifetime in hours.
    #[must_use]
    pub fn new(admin_repo: AdminRepository, session_ttl_hours: i64) -> Self {
        Self {
            admin_repo,
            session_ttl: Duration::hours(session_ttl_hours.max(1)),
            id_gen: IdGenerator::new(),
        }
    }

    /// Session lifetime.
    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Check credentials and open a session.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let input = LoginInput {
            email: input.email.trim().to_lowercase(),
            password: input.password,
        };
        input.validate()?;
        let email = input.email.as_str();

        let Some(user) = self.admin_repo.find_user_by_email(email).await? else {
            tracing::info!(email, "Login attempt for unknown admin");
            return Err(AppError::Unauthorized);
        };

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let now = Utc::now().fixed_offset();
        let expires_at = now + self.session_ttl;

        self.admin_repo
            .create_session(admin_session::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id.clone()),
                token_hash: Set(hash_token(&token)),
                created_at: Set(now),
                expires_at: Set(expires_at),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Admin logged in");

        Ok(LoginResponse {
            token,
            expires_at: expires_at.to_rfc3339(),
            user: SessionInfo {
                user_id: user.id,
                email: user.email,
            },
        })
    }

    /// Close the session owning `token`.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.admin_repo.delete_session(&hash_token(token)).await
    }

    /// Resolve a bearer token to its admin, if the session is still valid.
    pub async fn authenticate(&self, token: &str) -> AppResult<Option<SessionInfo>> {
        let Some(session) = self
            .admin_repo
            .find_active_session(&hash_token(token))
            .await?
        else {
            return Ok(None);
        };

        let user = self.admin_repo.find_user_by_id(&session.user_id).await?;
        Ok(user.map(|u| SessionInfo {
            user_id: u.id,
            email: u.email,
        }))
    }

    /// Create the configured admin account unless it already exists.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AppResult<bool> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Config(
                "admin.email and admin.password must not be empty".to_string(),
            ));
        }

        if self.admin_repo.find_user_by_email(&email).await?.is_some() {
            return Ok(false);
        }

        let user = self
            .admin_repo
            .create_user(admin_user::ActiveModel {
                id: Set(self.id_gen.generate()),
                email: Set(email),
                password_hash: Set(hash_password(password)?),
                created_at: Set(Utc::now().fixed_offset()),
            })
            .await?;

        tracing::info!(user_id = %user.id, email = %user.email, "Created admin account");
        Ok(true)
    }

    /// Remove expired sessions.
    pub async fn purge_expired_sessions(&self) -> AppResult<u64> {
        let removed = self.admin_repo.delete_expired_sessions().await?;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired admin sessions");
        }
        Ok(removed)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hex SHA-256 of a session token, as stored in the database.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_admin(password: &str) -> admin_user::Model {
        admin_user::Model {
            id: "a1".to_string(),
            email: "me@folio.example".to_string(),
            password_hash: hash_password(password).unwrap(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("abc"));
        assert_ne!(hash, hash_token("abd"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_admin("right")]])
                .into_connection(),
        );
        let service = AuthService::new(AdminRepository::new(db), 24);

        let err = service
            .login(LoginInput {
                email: "me@folio.example".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let admin = create_test_admin("right");
        let now = Utc::now().fixed_offset();
        let session = admin_session::Model {
            id: "s1".to_string(),
            user_id: admin.id.clone(),
            token_hash: "x".repeat(64),
            created_at: now,
            expires_at: now + Duration::hours(24),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[admin]])
                .append_query_results([[session]])
                .into_connection(),
        );
        let service = AuthService::new(AdminRepository::new(db), 24);

        let response = service
            .login(LoginInput {
                email: " Me@Folio.Example ".to_string(),
                password: "right".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.token.len(), 64);
        assert_eq!(response.user.user_id, "a1");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<admin_session::Model>::new()])
                .into_connection(),
        );
        let service = AuthService::new(AdminRepository::new(db), 24);
        assert!(service.authenticate("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_admin_skips_existing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_admin("pw")]])
                .into_connection(),
        );
        let service = AuthService::new(AdminRepository::new(db), 24);
        assert!(!service.ensure_admin("me@folio.example", "pw").await.unwrap());
    }
}
