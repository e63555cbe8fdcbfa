use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::db::DatabaseError;
use crate::validation::FieldError;

#[derive(Debug)]
pub enum ApiError {
    /// Client input failed schema validation; carries per-field messages.
    Validation {
        context: &'static str,
        errors: Vec<FieldError>,
    },
    /// Create with an email that is already registered.
    DuplicateEmail,
    /// Update attempted to change the email.
    EmailChange,
    /// Missing id or empty listing.
    NotFound(String),
    /// Request body was not parseable JSON.
    MalformedBody,
    /// Store failure with a descriptive message.
    Database(String),
    /// Unexpected failure; message included when one is available.
    Internal(Option<String>),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation { context, errors } => {
                write!(f, "{}: {} field error(s)", context, errors.len())
            }
            ApiError::DuplicateEmail => write!(f, "Email is already registered"),
            ApiError::EmailChange => write!(f, "Email cannot be updated"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::MalformedBody => write!(f, "Malformed request body"),
            ApiError::Database(msg) => write!(f, "Database error: {}", msg),
            ApiError::Internal(msg) => write!(
                f,
                "Internal error: {}",
                msg.as_deref().unwrap_or("An unexpected error occurred")
            ),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { context, errors } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": context,
                    "message": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                }),
            ),
            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                json!({
                    "error": "User already exists",
                    "details": "Email is already registered",
                }),
            ),
            ApiError::EmailChange => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Email cannot be updated",
                    "details": "Email is already registered and cannot be changed",
                }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::MalformedBody => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "message": "Invalid JSON format: check for unquoted strings or trailing commas.",
                }),
            ),
            ApiError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal server error",
                    "details": msg,
                }),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal server error",
                    "details": msg.as_deref().unwrap_or("An unexpected error occurred"),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            // The unique constraint on email is the real uniqueness
            // guarantee; a violation racing past the pre-check still maps
            // to the same conflict response.
            DatabaseError::UniqueViolation(_) => ApiError::DuplicateEmail,
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(Some(err.to_string()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let validation = ApiError::Validation {
            context: "Invalid registration data",
            errors: vec![FieldError::new("name", "Name is required")],
        };
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::DuplicateEmail.into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::EmailChange.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Student not found".to_string())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MalformedBody.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(None).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err = ApiError::from(DatabaseError::UniqueViolation(
            "UNIQUE constraint failed: students.email".to_string(),
        ));
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[test]
    fn db_not_found_becomes_http_not_found() {
        let err = ApiError::from(DatabaseError::NotFound("Student not found".to_string()));
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
