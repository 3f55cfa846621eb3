//! Store repository and rating aggregation queries.
//!
//! Every store read goes through [`StoreQuery`], which left-joins `ratings`
//! and groups per store so that unrated stores still appear with
//! `average_rating = 0` and `total_ratings = 0`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use star_rating_core::{Email, SortOrder, StoreId, StoreSortField, UserId};

use super::{RepositoryError, contains_pattern, direction_sql, map_unique_violation, search_term};
use crate::models::{NewStore, StoreWithRating};

/// Internal row type for aggregated store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    email: String,
    address: String,
    owner_id: i32,
    owner_name: Option<String>,
    average_rating: Decimal,
    total_ratings: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for StoreWithRating {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid store email in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            owner_id: UserId::new(row.owner_id),
            owner_name: row.owner_name,
            average_rating: row.average_rating,
            total_ratings: row.total_ratings,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Aggregation Query
// =============================================================================

/// Which stores to aggregate, and in what order.
#[derive(Debug, Clone, Default)]
pub struct StoreQuery {
    /// Case-insensitive substring matched against store name, address,
    /// email, or the owner's name.
    pub search: Option<String>,
    /// Restrict to stores owned by this user.
    pub owner: Option<UserId>,
    /// Restrict to a single store.
    pub store: Option<StoreId>,
    pub sort: StoreSortField,
    pub order: SortOrder,
}

impl StoreQuery {
    /// All stores owned by `owner`, in default order.
    #[must_use]
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    /// A single store.
    #[must_use]
    pub fn single(store: StoreId) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    /// SQL expression for an allow-listed sort key.
    const fn sort_column(field: StoreSortField) -> &'static str {
        match field {
            StoreSortField::Name => "s.name",
            StoreSortField::Email => "s.email",
            StoreSortField::Address => "s.address",
            StoreSortField::AverageRating => "average_rating",
            StoreSortField::TotalRatings => "total_ratings",
        }
    }

    fn build(&self) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new(
            r"SELECT s.id, s.name, s.email, s.address, s.owner_id,
                   o.name AS owner_name,
                   COALESCE(AVG(r.rating), 0) AS average_rating,
                   COUNT(r.id) AS total_ratings,
                   s.created_at
            FROM stores s
            LEFT JOIN users o ON o.id = s.owner_id
            LEFT JOIN ratings r ON r.store_id = s.id
            WHERE TRUE",
        );

        if let Some(term) = search_term(self.search.as_deref()) {
            let pattern = contains_pattern(term);
            qb.push(" AND (s.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR s.address ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR s.email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR o.name ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(owner) = self.owner {
            qb.push(" AND s.owner_id = ");
            qb.push_bind(owner);
        }

        if let Some(store) = self.store {
            qb.push(" AND s.id = ");
            qb.push_bind(store);
        }

        qb.push(" GROUP BY s.id, o.id ORDER BY ");
        qb.push(Self::sort_column(self.sort));
        qb.push(direction_sql(self.order));
        qb.push(", s.id ASC");
        qb
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run an aggregation query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &StoreQuery) -> Result<Vec<StoreWithRating>, RepositoryError> {
        let rows = query
            .build()
            .build_query_as::<StoreRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get one store with its aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<StoreWithRating>, RepositoryError> {
        let mut stores = self.list(&StoreQuery::single(id)).await?;
        Ok(stores.pop())
    }

    /// Look up who owns a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_owner(&self, id: StoreId) -> Result<Option<UserId>, RepositoryError> {
        let owner = sqlx::query_scalar::<_, UserId>("SELECT owner_id FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(owner)
    }

    /// Whether a store with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM stores WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, store: &NewStore) -> Result<StoreId, RepositoryError> {
        let id = sqlx::query_scalar::<_, StoreId>(
            r"INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id",
        )
        .bind(store.name.as_str())
        .bind(&store.email)
        .bind(store.address.as_str())
        .bind(store.owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "store email"))?;

        Ok(id)
    }
}
