//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! represent every failure condition, from authentication failures to database
//! issues.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert
//! application errors into structured JSON responses of the shape
//! `{"code", "message", "details"}`, with a machine-readable code and a human
//! message. It also provides `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors` and `bcrypt::BcryptError`, allowing for easy
//! conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::{json, Value};
use std::fmt;
use validator::ValidationErrors;

/// Represents all errors that can occur within the application.
///
/// Token verification failures are deliberately split into two variants:
/// `InvalidToken` covers anything structurally wrong (malformed, unsigned,
/// wrong signature, missing claims), while `ExpiredToken` means the signature
/// verified but the embedded expiry has passed. Both map to 401, but clients
/// can distinguish them through the response code.
#[derive(Debug, PartialEq)]
pub enum AppError {
    /// Wrong email or password at sign-in (HTTP 401). The message never
    /// reveals which of the two was wrong.
    InvalidCredentials,
    /// Sign-up attempted with an already-registered email (HTTP 409).
    EmailExists(String),
    /// Token is malformed, unsigned, carries a bad signature, or is missing
    /// required claims (HTTP 401).
    InvalidToken,
    /// Token signature is valid but the token is past its expiry (HTTP 401).
    ExpiredToken,
    /// A token was required but none was supplied or it was unreadable
    /// (HTTP 401).
    Unauthenticated,
    /// Resource is absent, or exists but is owned by someone else — the two
    /// cases are indistinguishable on purpose (HTTP 404).
    NotFound(String),
    /// Input validation failed (HTTP 422).
    Validation(String),
    /// Error originating from database operations (HTTP 500).
    Database(String),
    /// Unexpected server-side error (HTTP 500).
    Internal(String),
}

impl AppError {
    /// Machine-readable code carried in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::EmailExists(_) => "EMAIL_EXISTS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::ExpiredToken => "EXPIRED_TOKEN",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::EmailExists(_) => "Email address is already registered".to_string(),
            AppError::InvalidToken => "Invalid token".to_string(),
            AppError::ExpiredToken => "Token has expired".to_string(),
            AppError::Unauthenticated => "Authentication required".to_string(),
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::Validation(msg) => msg.clone(),
            // Internal detail is logged, not leaked to the client.
            AppError::Database(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    fn details(&self) -> Value {
        match self {
            AppError::EmailExists(email) => json!({ "email": email }),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(msg) => write!(f, "{}: {}", self.code(), msg),
            AppError::Internal(msg) => write!(f, "{}: {}", self.code(), msg),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This lets Actix Web translate `AppError` results from handlers into the
/// correct HTTP status codes and the structured JSON error body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::EmailExists(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "code": self.code(),
            "message": self.message(),
            "details": self.details(),
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record".into()),
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`,
/// preserving the detailed messages.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
///
/// Hashing only fails on internal errors; verification against a malformed
/// hash is handled as a plain mismatch in `auth::password` and never reaches
/// this conversion.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::InvalidCredentials.error_response().status(), 401);
        assert_eq!(
            AppError::EmailExists("a@b.com".into()).error_response().status(),
            409
        );
        assert_eq!(AppError::InvalidToken.error_response().status(), 401);
        assert_eq!(AppError::ExpiredToken.error_response().status(), 401);
        assert_eq!(AppError::Unauthenticated.error_response().status(), 401);
        assert_eq!(AppError::NotFound("Task".into()).error_response().status(), 404);
        assert_eq!(
            AppError::Validation("Title is required".into())
                .error_response()
                .status(),
            422
        );
        assert_eq!(
            AppError::Database("connection reset".into())
                .error_response()
                .status(),
            500
        );
    }

    #[test]
    fn test_machine_readable_codes() {
        assert_eq!(AppError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
        assert_eq!(AppError::EmailExists("a@b.com".into()).code(), "EMAIL_EXISTS");
        assert_eq!(AppError::InvalidToken.code(), "INVALID_TOKEN");
        assert_eq!(AppError::ExpiredToken.code(), "EXPIRED_TOKEN");
        assert_eq!(AppError::Unauthenticated.code(), "UNAUTHENTICATED");
        assert_eq!(AppError::NotFound("Task".into()).code(), "NOT_FOUND");
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let error = AppError::Database("password authentication failed".into());
        // The client-facing message must not carry the internal detail.
        assert_eq!(
            serde_json::to_value(error.message()).unwrap(),
            serde_json::json!("Internal server error")
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(error, AppError::NotFound("Record".into()));
    }
}
