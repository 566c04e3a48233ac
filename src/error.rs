//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce ends up as one of its variants, and
//! `AppError` implements `actix_web::error::ResponseError` so the variant decides the
//! HTTP status and the JSON body (`{"error": "..."}`).
//!
//! Server-side failures (`DatabaseError`, `InternalServerError`) are logged with their
//! details and answered with a generic message so internals never reach the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use validator::ValidationErrors;

/// Message returned to clients for every 5xx response.
const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, invalid, expired or revoked credentials (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// A malformed request, or a deliberately opaque failure such as a bad login (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The resource does not exist or is not owned by the caller (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Input failed field-level validation, including duplicate emails (HTTP 400).
    #[error("Validation Error: {0}")]
    ValidationError(String),
    /// Unexpected failure in the persistence layer (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                log::error!("{}", self);
                GENERIC_SERVER_ERROR
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique constraint violations only come from `users.email`, so they surface as a
/// validation error on that field. `RowNotFound` becomes `NotFound`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::ValidationError("email: Email is already registered".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed, per-field validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Failed to hash password: {}", error))
    }
}

/// Undecodable uploads are the client's fault.
impl From<image::ImageError> for AppError {
    fn from(error: image::ImageError) -> AppError {
        log::debug!("Rejected avatar image: {}", error);
        AppError::BadRequest("Please upload a valid image".into())
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> AppError {
        AppError::BadRequest(format!("Invalid upload: {}", error))
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::ValidationError("email: invalid".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::DatabaseError("connection refused".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_server_errors_do_not_leak_details() {
        let error = AppError::DatabaseError("password authentication failed for user app".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], GENERIC_SERVER_ERROR);
    }

    #[actix_rt::test]
    async fn test_client_errors_carry_message() {
        let error = AppError::NotFound("Task not found".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Task not found");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
    }
}
