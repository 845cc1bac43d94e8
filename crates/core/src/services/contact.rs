//! Contact message service.

use chrono::Utc;
use folio_common::{AppError, AppResult, IdGenerator};
use folio_db::entities::contact;
use folio_db::repositories::ContactRepository;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public contact form submission.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(required, length(min = 1, max = 256))]
    pub name: Option<String>,
    #[validate(required, length(min = 1, max = 512))]
    pub email: Option<String>,
    #[validate(required, length(min = 1, max = 10000))]
    pub message: Option<String>,
}

impl ContactInput {
    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            name: trim(self.name),
            email: trim(self.email),
            message: trim(self.message),
        }
    }
}

/// Contact message as listed in the admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl From<contact::Model> for ContactResponse {
    fn from(c: contact::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            message: c.message,
            read: c.read,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Service for contact messages.
#[derive(Clone)]
pub struct ContactService {
    contact_repo: ContactRepository,
    id_gen: IdGenerator,
}

impl ContactService {
    /// Create a new contact service.
    #[must_use]
    pub const fn new(contact_repo: ContactRepository) -> Self {
        Self {
            contact_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Store a message. Every field must be present and non-blank.
    pub async fn submit(&self, input: ContactInput) -> AppResult<contact::Model> {
        let input = input.trimmed();
        input.validate()?;

        let (Some(name), Some(email), Some(message)) = (input.name, input.email, input.message)
        else {
            return Err(AppError::Validation("All fields are required".to_string()));
        };

        let model = contact::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            email: Set(email),
            message: Set(message),
            read: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let contact = self.contact_repo.create(model).await?;
        tracing::info!(contact_id = %contact.id, "Stored contact message");
        Ok(contact)
    }

    /// All messages, newest first.
    pub async fn list(&self) -> AppResult<Vec<ContactResponse>> {
        let contacts = self.contact_repo.find_all().await?;
        Ok(contacts.into_iter().map(Into::into).collect())
    }

    /// Mark a message as read.
    pub async fn mark_read(&self, id: &str) -> AppResult<()> {
        self.contact_repo.mark_read(id).await
    }

    /// Delete a message.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.contact_repo.delete(id).await?;
        tracing::info!(contact_id = %id, "Deleted contact message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn input(name: &str, email: &str, message: &str) -> ContactInput {
        ContactInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_missing_field_writes_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = ContactService::new(ContactRepository::new(db.clone()));

        let missing = ContactInput {
            email: None,
            ..input("Ada", "ada@example.com", "Hi")
        };
        let err = service.submit(missing).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let blank = input("Ada", "ada@example.com", "   ");
        let err = service.submit(blank).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        drop(service);
        let db = Arc::try_unwrap(db).unwrap();
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_submit_stores_unread_message() {
        let stored = contact::Model {
            id: "c1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello there".to_string(),
            read: false,
            created_at: Utc::now().fixed_offset(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored]])
                .into_connection(),
        );
        let service = ContactService::new(ContactRepository::new(db));

        let contact = service
            .submit(input(" Ada ", "ada@example.com", "Hello there"))
            .await
            .unwrap();
        assert_eq!(contact.name, "Ada");
        assert!(!contact.read);
    }
}
