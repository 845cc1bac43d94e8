//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_common::AppError;
use serde::Serialize;
use serde_json::json;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Result of an admin create, update or delete: `{"success": true, "id": ...}`.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    pub id: String,
}

impl MutationResponse {
    /// A new record was stored.
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            success: true,
            id: id.into(),
        }
    }

    /// An existing record was changed or removed.
    pub fn done(id: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            id: id.into(),
        }
    }
}

impl IntoResponse for MutationResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Error body used by form-style endpoints: `{"error": message}`.
#[derive(Debug)]
pub struct FlatError {
    status: StatusCode,
    message: String,
}

impl FlatError {
    /// Error with an explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<AppError> for FlatError {
    fn from(err: AppError) -> Self {
        err.log();
        Self::new(err.status_code(), err.public_message())
    }
}

impl IntoResponse for FlatError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Result type of form-style endpoints.
pub type FlatResult<T> = Result<T, FlatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_error_keeps_client_message() {
        let err = FlatError::from(AppError::Validation("Title is required".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Title is required");
    }

    #[test]
    fn test_flat_error_hides_database_detail() {
        let err = FlatError::from(AppError::Database("connection reset".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_mutation_response_body() {
        let body = serde_json::to_value(MutationResponse::created("01j0")).unwrap();
        assert_eq!(body, json!({ "success": true, "id": "01j0" }));
    }
}
