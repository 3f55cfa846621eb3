//! User repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use star_rating_core::{Email, PersonName, PostalAddress, Role, SortOrder, UserId, UserSortField};

use super::{RepositoryError, contains_pattern, direction_sql, map_unique_violation, search_term};
use crate::models::{User, UserSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

const USER_COLUMNS: &str = "id, name, email, address, role, created_at, updated_at";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email: parse_stored_email(&row.email)?,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for the admin listing.
#[derive(Debug, sqlx::FromRow)]
struct UserSummaryRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    role: Role,
    average_rating: Option<Decimal>,
}

impl TryFrom<UserSummaryRow> for UserSummary {
    type Error = RepositoryError;

    fn try_from(row: UserSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email: parse_stored_email(&row.email)?,
            address: row.address,
            role: row.role,
            average_rating: row.average_rating,
        })
    }
}

/// Internal row type carrying the password hash for login checks.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

fn parse_stored_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

// =============================================================================
// Listing Query
// =============================================================================

/// Filters and ordering for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Case-insensitive substring matched against name, email and address.
    pub search: Option<String>,
    /// Only return users holding this role.
    pub role: Option<Role>,
    pub sort: UserSortField,
    pub order: SortOrder,
}

impl UserQuery {
    /// SQL expression for an allow-listed sort key.
    const fn sort_column(field: UserSortField) -> &'static str {
        match field {
            UserSortField::Name => "u.name",
            UserSortField::Email => "u.email",
            UserSortField::Address => "u.address",
            UserSortField::Role => "u.role::text",
        }
    }

    /// Build the listing query. Store owners get the mean over all ratings of
    /// all their stores (0 when unrated); every other role gets `NULL`.
    fn build(&self) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new(
            r"SELECT u.id, u.name, u.email, u.address, u.role,
                   CASE WHEN u.role = 'store_owner' THEN (
                       SELECT COALESCE(AVG(r.rating), 0)
                       FROM stores s
                       LEFT JOIN ratings r ON r.store_id = s.id
                       WHERE s.owner_id = u.id
                   ) END AS average_rating
            FROM users u
            WHERE TRUE",
        );

        if let Some(term) = search_term(self.search.as_deref()) {
            let pattern = contains_pattern(term);
            qb.push(" AND (u.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR u.email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR u.address ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(role) = self.role {
            qb.push(" AND u.role = ");
            qb.push_bind(role);
        }

        qb.push(" ORDER BY ");
        qb.push(Self::sort_column(self.sort));
        qb.push(direction_sql(self.order));
        qb.push(", u.id ASC");
        qb
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether an account with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Get a user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| User::try_from(r.user).map(|user| (user, r.password_hash)))
            .transpose()
    }

    /// Get the password hash for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(hash)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &PersonName,
        email: &Email,
        password_hash: &str,
        address: &PostalAddress,
        role: Role,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"INSERT INTO users (name, email, password_hash, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}"
        ))
        .bind(name.as_str())
        .bind(email)
        .bind(password_hash)
        .bind(address.as_str())
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        row.try_into()
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update a user's name and address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: &PersonName,
        address: &PostalAddress,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"UPDATE users SET name = $1, address = $2, updated_at = now()
            WHERE id = $3
            RETURNING {USER_COLUMNS}"
        ))
        .bind(name.as_str())
        .bind(address.as_str())
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// List users for the admin view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &UserQuery) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = query
            .build()
            .build_query_as::<UserSummaryRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
