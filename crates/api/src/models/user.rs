//! User domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use star_rating_core::{Email, Password, PersonName, PostalAddress, Role, UserId};

/// A user account (domain type). Never includes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the admin user listing.
///
/// `average_rating` is the mean over every rating of every store the user
/// owns, and is only present for `store_owner` accounts.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub role: Role,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_rating: Option<Decimal>,
}

/// The caller's identity, derived from a verified session token on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
}

impl Identity {
    /// Whether the caller holds `role`.
    #[must_use]
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

/// A validated request to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: PersonName,
    pub email: Email,
    pub password: Password,
    pub address: PostalAddress,
    pub role: Role,
}
