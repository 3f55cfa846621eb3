//! Rating domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use star_rating_core::{RatingId, RatingValue, StoreId, UserId};

/// A single rating row.
#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: RatingValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether a submission created a new row or overwrote the caller's previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// One of the caller's own ratings, with the rated store's name.
#[derive(Debug, Clone, Serialize)]
pub struct UserRating {
    #[serde(flatten)]
    pub rating: Rating,
    pub store_name: String,
}

/// A rating on a given store, with the rater's name.
#[derive(Debug, Clone, Serialize)]
pub struct StoreRating {
    #[serde(flatten)]
    pub rating: Rating,
    pub user_name: String,
}

/// System-wide row counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}
