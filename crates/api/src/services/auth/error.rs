//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The supplied current password did not match on a password change.
    #[error("current password is incorrect")]
    WrongPassword,

    /// An account with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// The account behind a valid token no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Session token could not be signed.
    #[error("token signing failed: {0}")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// A session token failed verification (bad signature, expired or malformed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid or expired token")]
pub struct InvalidToken;
