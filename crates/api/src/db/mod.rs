//! Database operations for the ratings `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts for every role (`admin`, `user`, `store_owner`)
//! - `stores` - Rated stores, each owned by one `store_owner`
//! - `ratings` - One row per (user, store), upserted on resubmission
//!
//! Uniqueness of `users.email`, `stores.email` and `ratings (user_id, store_id)`
//! is enforced by constraints; repositories translate violations into
//! [`RepositoryError::Conflict`] instead of pre-checking.
//!
//! Queries are built at runtime. Every caller-supplied value is bound as a
//! parameter; only allow-listed identifiers from `star_rating_core::sort`
//! are ever written into SQL text.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p star-rating-cli -- migrate
//! ```

pub mod ratings;
pub mod stores;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use star_rating_core::SortOrder;

pub use ratings::RatingRepository;
pub use stores::{StoreQuery, StoreRepository};
pub use users::{UserQuery, UserRepository};

/// Embedded migrations for the ratings schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Build an `ILIKE` pattern matching `term` as a literal substring.
///
/// `%`, `_` and the escape character itself are backslash-escaped so user
/// input cannot widen the match.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// SQL keyword for a sort direction.
const fn direction_sql(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => " ASC",
        SortOrder::Desc => " DESC",
    }
}

/// Normalize an optional search term: trimmed, `None` when blank.
fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}
