//! Rating submission and rating reads.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use star_rating_core::{RatingValue, StoreId};

use super::{ApiJson, ApiPath, Deferred};
use crate::db::RatingRepository;
use crate::error::{AppError, Result};
use crate::middleware::Caller;
use crate::models::{DashboardStats, Rating, StoreRating, UpsertOutcome, UserRating};
use crate::services::policy::Action;
use crate::services::stores::StoreService;
use crate::state::AppState;
use crate::validation::{ValidationErrors, integer_field};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: serde_json::Value,
    pub rating: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SubmitRatingResponse {
    pub message: &'static str,
    pub rating: Rating,
}

/// Rate a store, or replace the caller's earlier rating of it.
///
/// POST /api/ratings
///
/// Answers 201 when a rating was created and 200 when it replaced the
/// caller's previous one.
///
/// # Errors
///
/// 403 unless role `user`; 400 if `rating` is not an integer 1-5; 404 if
/// the store does not exist.
pub async fn submit(
    State(state): State<AppState>,
    caller: Caller,
    body: Deferred<ApiJson<SubmitRatingRequest>>,
) -> Result<(StatusCode, Json<SubmitRatingResponse>)> {
    let identity = caller.require(Action::SubmitRating)?;
    let ApiJson(req) = body?;

    let mut errors = ValidationErrors::new();
    let store_id = errors.check(
        "storeId",
        integer_field(&req.store_id).and_then(|id| i32::try_from(id).map_err(|_| "is out of range")),
    );
    let value = errors
        .check("rating", integer_field(&req.rating))
        .and_then(|v| errors.check("rating", RatingValue::new(v)));
    let (Some(store_id), Some(value)) = (store_id, value) else {
        return Err(errors.into());
    };

    let (rating, outcome) = RatingRepository::new(state.pool())
        .upsert(identity.id, StoreId::new(store_id), value)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound("Store"),
            other => other.into(),
        })?;

    tracing::info!(
        user_id = %identity.id,
        store_id = %rating.store_id,
        rating = %rating.rating,
        ?outcome,
        "Rating saved"
    );

    let (status, message) = match outcome {
        UpsertOutcome::Created => (StatusCode::CREATED, "Rating submitted successfully"),
        UpsertOutcome::Updated => (StatusCode::OK, "Rating updated successfully"),
    };
    Ok((status, Json(SubmitRatingResponse { message, rating })))
}

/// The caller's own ratings with store names.
///
/// GET /api/ratings/user
///
/// # Errors
///
/// 401 without a session.
pub async fn mine(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<UserRating>>> {
    let identity = caller.require(Action::ListOwnRatings)?;
    let ratings = RatingRepository::new(state.pool())
        .list_for_user(identity.id)
        .await?;
    Ok(Json(ratings))
}

/// Every rating on a store with rater names.
///
/// GET /api/ratings/store/{id}
///
/// # Errors
///
/// 403 for plain users and for store owners asking about another owner's
/// store; 404 if the store does not exist.
pub async fn for_store(
    State(state): State<AppState>,
    caller: Caller,
    path: Deferred<ApiPath<i32>>,
) -> Result<Json<Vec<StoreRating>>> {
    let identity = caller.require(Action::ListStoreRatings)?;
    let ApiPath(id) = path?;
    let ratings = StoreService::new(state.pool())
        .ratings(&identity, StoreId::new(id))
        .await?;
    Ok(Json(ratings))
}

/// System-wide counts.
///
/// GET /api/ratings/stats
///
/// # Errors
///
/// 403 unless admin.
pub async fn stats(State(state): State<AppState>, caller: Caller) -> Result<Json<DashboardStats>> {
    caller.require(Action::ViewStats)?;
    let stats = RatingRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}
