//! Rating repository: upsert, per-user and per-store listings, dashboard counts.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use star_rating_core::{RatingId, RatingValue, StoreId, UserId};

use super::RepositoryError;
use crate::models::{DashboardStats, Rating, StoreRating, UpsertOutcome, UserRating};

const RATING_COLUMNS: &str = "r.id, r.user_id, r.store_id, r.rating, r.created_at, r.updated_at";

/// Internal row type for rating queries.
#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: i32,
    user_id: i32,
    store_id: i32,
    rating: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = RepositoryError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let rating = RatingValue::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("rating {} out of range: {e}", row.id))
        })?;

        Ok(Self {
            id: RatingId::new(row.id),
            user_id: UserId::new(row.user_id),
            store_id: StoreId::new(row.store_id),
            rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    rating: RatingRow,
    inserted: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRatingRow {
    #[sqlx(flatten)]
    rating: RatingRow,
    store_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct StoreRatingRow {
    #[sqlx(flatten)]
    rating: RatingRow,
    user_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    total_stores: i64,
    total_ratings: i64,
}

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the caller's rating for a store, or overwrite their existing one.
    ///
    /// A single `INSERT .. ON CONFLICT DO UPDATE` statement keyed on
    /// `(user_id, store_id)`, so concurrent submissions converge on one row.
    /// `xmax = 0` holds only for a freshly inserted tuple.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store (or user) no longer exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<(Rating, UpsertOutcome), RepositoryError> {
        let row = sqlx::query_as::<_, UpsertRow>(
            r"INSERT INTO ratings AS r (user_id, store_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
            RETURNING r.id, r.user_id, r.store_id, r.rating, r.created_at, r.updated_at,
                      (r.xmax = 0) AS inserted",
        )
        .bind(user_id)
        .bind(store_id)
        .bind(value)
        .fetch_one(self.pool)
        .await
        .map_err(map_missing_reference)?;

        let outcome = if row.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };
        Ok((row.rating.try_into()?, outcome))
    }

    /// The caller's own ratings, newest first, with store names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserRating>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRatingRow>(&format!(
            r"SELECT {RATING_COLUMNS}, s.name AS store_name
            FROM ratings r
            JOIN stores s ON s.id = r.store_id
            WHERE r.user_id = $1
            ORDER BY r.updated_at DESC, r.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(UserRating {
                    rating: row.rating.try_into()?,
                    store_name: row.store_name,
                })
            })
            .collect()
    }

    /// Every rating on a store, newest first, with rater names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<StoreRating>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRatingRow>(&format!(
            r"SELECT {RATING_COLUMNS}, u.name AS user_name
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.store_id = $1
            ORDER BY r.updated_at DESC, r.id DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(StoreRating {
                    rating: row.rating.try_into()?,
                    user_name: row.user_name,
                })
            })
            .collect()
    }

    /// Row counts of all three tables, read in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM stores) AS total_stores,
                (SELECT COUNT(*) FROM ratings) AS total_ratings",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            total_users: row.total_users,
            total_stores: row.total_stores,
            total_ratings: row.total_ratings,
        })
    }
}

/// Map a foreign-key violation to `NotFound`, anything else to `Database`.
fn map_missing_reference(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(rating: i16) -> RatingRow {
        RatingRow {
            id: 7,
            user_id: 2,
            store_id: 3,
            rating,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let rating = Rating::try_from(row(4)).unwrap();
        assert_eq!(rating.id, RatingId::new(7));
        assert_eq!(rating.user_id, UserId::new(2));
        assert_eq!(rating.store_id, StoreId::new(3));
        assert_eq!(rating.rating.get(), 4);
    }

    #[test]
    fn test_out_of_range_row_is_corruption() {
        let result = Rating::try_from(row(9));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }

    #[test]
    fn test_non_database_error_passes_through() {
        let err = map_missing_reference(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
