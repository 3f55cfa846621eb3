//! Store domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use star_rating_core::{Email, PostalAddress, StoreId, StoreName, UserId};

/// A store together with its rating aggregates.
///
/// Aggregates are computed at query time from the `ratings` table, so they
/// are never stale relative to the rows that produced them. A store with no
/// ratings has `average_rating = 0` and `total_ratings = 0`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreWithRating {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub owner_id: UserId,
    pub owner_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_rating: Decimal,
    pub total_ratings: i64,
    pub created_at: DateTime<Utc>,
}

/// A validated request to create a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: StoreName,
    pub email: Email,
    pub address: PostalAddress,
    pub owner_id: UserId,
}
