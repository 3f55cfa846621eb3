//! Authentication service.
//!
//! Provides account creation, password login, password changes and the
//! session token service.

mod error;
mod token;

pub use error::{AuthError, InvalidToken};
pub use token::TokenService;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use star_rating_core::{Email, Password, PersonName, PostalAddress, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{Identity, NewAccount, User};

/// A successful login: the session token and the account it belongs to.
#[derive(Debug)]
pub struct LoginSession {
    pub token: String,
    pub user: User,
}

/// Authentication service.
///
/// Handles registration, admin account creation, login and profile changes.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Self-registration. Always creates a `user` account whatever role was asked for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    pub async fn register(&self, account: NewAccount) -> Result<User, AuthError> {
        self.create_account(NewAccount {
            role: Role::User,
            ..account
        })
        .await
    }

    /// Create an account with the role given in `account`.
    ///
    /// The email is checked before hashing so obvious duplicates skip the
    /// hashing cost; the unique constraint still decides races.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    pub async fn create_account(&self, account: NewAccount) -> Result<User, AuthError> {
        if self.users.email_exists(&account.email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(account.password.expose())?;

        let user = self
            .users
            .create(
                &account.name,
                &account.email,
                &password_hash,
                &account.address,
                account.role,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account created");
        Ok(user)
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Login with email and password.
    ///
    /// Inputs are not format-validated: anything that does not match a stored
    /// account is `InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let account = match Email::parse(email) {
            Ok(email) => self.users.get_credentials_by_email(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = account else {
            // Unknown emails still pay for one Argon2 verify.
            if let Some(hash) = DUMMY_HASH.as_deref() {
                verify_password(password, hash).ok();
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(&Identity {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginSession { token, user })
    }

    /// Change a password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongPassword` if `current` does not match.
    /// Returns `AuthError::UserNotFound` if the account no longer exists.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &Password,
    ) -> Result<(), AuthError> {
        let stored = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current, &stored).map_err(|_| AuthError::WrongPassword)?;

        let password_hash = hash_password(new.expose())?;
        self.users
            .update_password(user_id, &password_hash)
            .await
            .map_err(not_found_as_missing_user)?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Get the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update the caller's name and address.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: &PersonName,
        address: &PostalAddress,
    ) -> Result<User, AuthError> {
        self.users
            .update_profile(user_id, name, address)
            .await
            .map_err(not_found_as_missing_user)
    }
}

fn not_found_as_missing_user(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::NotFound => AuthError::UserNotFound,
        other => AuthError::Repository(other),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hash a password with Argon2id into a PHC string.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Hash verified on logins that match no account.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("Unmatched!Login1").ok());

/// Verify a password against a PHC hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
