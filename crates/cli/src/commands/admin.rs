//! Administrator bootstrap.
//!
//! Self-registration only ever creates `user` accounts and only an admin
//! can create other admins, so the first administrator is created here.
//!
//! # Usage
//!
//! ```bash
//! SR_ADMIN_PASSWORD='Change!Me42' sr-cli admin create \
//!     -e admin@example.com -n "Platform Administrator" -a "1 Main Street"
//! ```
//!
//! When `SR_ADMIN_PASSWORD` is unset the password is read from stdin.

use std::io::BufRead;

use star_rating_api::db::{RepositoryError, UserRepository};
use star_rating_api::services::auth::hash_password;
use star_rating_core::{Email, Password, PersonName, PostalAddress, Role, UserId};

use super::{CommandError, connect};

/// Create a new administrator account.
///
/// # Errors
///
/// Returns an error if a field is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(email: &str, name: &str, address: &str) -> Result<UserId, CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::invalid("email", e))?;
    let name = PersonName::parse(name).map_err(|e| CommandError::invalid("name", e))?;
    let address = PostalAddress::parse(address).map_err(|e| CommandError::invalid("address", e))?;
    let password = read_password()?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    if users.email_exists(&email).await? {
        return Err(CommandError::UserExists(email.into_inner()));
    }

    tracing::info!("Creating admin user: {}", email);
    let password_hash = hash_password(password.expose())?;
    let user = users
        .create(&name, &email, &password_hash, &address, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => CommandError::UserExists(email.as_str().to_owned()),
            other => other.into(),
        })?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}

/// Password from `SR_ADMIN_PASSWORD`, or the first line of stdin.
#[allow(clippy::print_stderr)]
fn read_password() -> Result<Password, CommandError> {
    let raw = match std::env::var("SR_ADMIN_PASSWORD") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Password (8-16 chars, one uppercase, one of !@#$%^&*):");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_owned()
        }
    };
    Password::parse(&raw).map_err(|e| CommandError::invalid("password", e))
}
