//! Store creation and store-scoped reads.

use sqlx::PgPool;
use thiserror::Error;

use star_rating_core::{Role, StoreId, UserId};

use crate::db::{RatingRepository, RepositoryError, StoreRepository, UserRepository};
use crate::models::{Identity, NewStore, StoreRating, StoreWithRating};
use crate::services::policy::{self, Action, PolicyError};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested owner is missing, unknown, or not a store owner.
    #[error("invalid owner: {0}")]
    InvalidOwner(&'static str),

    /// A store with this email already exists.
    #[error("store email already registered")]
    DuplicateEmail,

    #[error("store not found")]
    NotFound,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Store operations that depend on who is asking.
pub struct StoreService<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Decide who will own a new store.
    ///
    /// Store owners always own what they create. Admins must name an
    /// existing `store_owner` account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidOwner` if an admin names no owner, an
    /// unknown account, or an account that is not a store owner.
    pub async fn resolve_owner(
        &self,
        caller: &Identity,
        requested: Option<UserId>,
    ) -> Result<UserId, StoreError> {
        if caller.is(Role::StoreOwner) {
            return Ok(caller.id);
        }

        let owner_id = requested.ok_or(StoreError::InvalidOwner("is required"))?;
        let owner = UserRepository::new(self.pool)
            .get_by_id(owner_id)
            .await?
            .ok_or(StoreError::InvalidOwner("does not name an existing user"))?;

        if owner.role != Role::StoreOwner {
            return Err(StoreError::InvalidOwner("must name a store owner"));
        }
        Ok(owner.id)
    }

    /// Create a store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateEmail` if the store email is taken.
    pub async fn create(&self, store: &NewStore) -> Result<StoreId, StoreError> {
        let stores = StoreRepository::new(self.pool);
        if stores.email_exists(&store.email).await? {
            return Err(StoreError::DuplicateEmail);
        }

        let id = stores.create(store).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => StoreError::DuplicateEmail,
            other => StoreError::Repository(other),
        })?;

        tracing::info!(store_id = %id, owner_id = %store.owner_id, "Store created");
        Ok(id)
    }

    /// One store with aggregates, if the caller may see it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the store doesn't exist.
    /// Returns `StoreError::Policy` if a store owner asks for another owner's store.
    pub async fn view(&self, caller: &Identity, id: StoreId) -> Result<StoreWithRating, StoreError> {
        let store = StoreRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(StoreError::NotFound)?;
        policy::authorize_for_store(Action::ViewStore, caller, store.owner_id)?;
        Ok(store)
    }

    /// Every rating on a store, if the caller may see them.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the store doesn't exist.
    /// Returns `StoreError::Policy` if a store owner asks about another owner's store.
    pub async fn ratings(
        &self,
        caller: &Identity,
        id: StoreId,
    ) -> Result<Vec<StoreRating>, StoreError> {
        let owner = StoreRepository::new(self.pool)
            .get_owner(id)
            .await?
            .ok_or(StoreError::NotFound)?;
        policy::authorize_for_store(Action::ListStoreRatings, caller, owner)?;

        Ok(RatingRepository::new(self.pool).list_for_store(id).await?)
    }
}
