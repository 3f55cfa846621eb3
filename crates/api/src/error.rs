//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body is JSON `{"message": ...}`; validation failures add an
//! `errors` array of `{field, message}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::policy::PolicyError;
use crate::services::stores::StoreError;
use crate::validation::{FieldError, ValidationErrors};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Caller not signed in, or not allowed.
    #[error("Policy: {0}")]
    Policy(#[from] PolicyError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// One or more request fields are invalid.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    /// Malformed request (unparseable body, path or query).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::WrongPassword
                | AuthError::DuplicateEmail => StatusCode::BAD_REQUEST,
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                AuthError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                AuthError::TokenSigning(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Policy(err) => policy_status(*err),
            Self::Store(err) => match err {
                StoreError::InvalidOwner(_) | StoreError::DuplicateEmail => StatusCode::BAD_REQUEST,
                StoreError::NotFound | StoreError::Repository(RepositoryError::NotFound) => {
                    StatusCode::NOT_FOUND
                }
                StoreError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                StoreError::Policy(err) => policy_status(*err),
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Server-side failures never leak detail.
    fn message(&self) -> String {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return "Internal server error".to_string();
        }
        match self {
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::WrongPassword => "Current password is incorrect".to_string(),
                AuthError::DuplicateEmail => "Email already registered".to_string(),
                AuthError::UserNotFound => "User not found".to_string(),
                _ => "Not found".to_string(),
            },
            Self::Policy(err) | Self::Store(StoreError::Policy(err)) => policy_message(*err),
            Self::Store(StoreError::DuplicateEmail) => "Store email already registered".to_string(),
            Self::Store(StoreError::InvalidOwner(_)) | Self::Validation(_) => {
                "Validation failed".to_string()
            }
            Self::Store(_) => "Store not found".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
            _ => "Not found".to_string(),
        }
    }
}

const fn policy_status(err: PolicyError) -> StatusCode {
    match err {
        PolicyError::Unauthenticated => StatusCode::UNAUTHORIZED,
        PolicyError::Forbidden => StatusCode::FORBIDDEN,
    }
}

fn policy_message(err: PolicyError) -> String {
    match err {
        PolicyError::Unauthenticated => "Authentication required".to_string(),
        PolicyError::Forbidden => "Access denied".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let owner_error;
        let errors = match &self {
            Self::Validation(errors) => Some(errors.errors()),
            Self::Store(StoreError::InvalidOwner(reason)) => {
                owner_error = ValidationErrors::single("user_id", *reason);
                Some(owner_error.errors())
            }
            _ => None,
        };

        let body = ErrorBody {
            message: self.message(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the authenticated caller.
///
/// Only the id is sent; emails stay out of error reports.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
