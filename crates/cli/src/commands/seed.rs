//! Demo data for local development.
//!
//! Creates one admin, one store owner with a store, and one user who has
//! rated that store. Safe to run repeatedly: existing accounts and stores
//! (matched by email) are reused, and the rating is an upsert.
//!
//! All seeded accounts share the password from `SR_SEED_PASSWORD`
//! (default `Demo!Pass1`).

use sqlx::PgPool;

use star_rating_api::db::{RatingRepository, StoreQuery, StoreRepository, UserRepository};
use star_rating_api::models::{NewStore, User};
use star_rating_api::services::auth::hash_password;
use star_rating_core::{
    Email, Password, PersonName, PostalAddress, RatingValue, Role, StoreId, StoreName,
};

use super::{CommandError, connect};

const DEFAULT_PASSWORD: &str = "Demo!Pass1";

struct SeedAccount {
    name: &'static str,
    email: &'static str,
    address: &'static str,
    role: Role,
}

const ADMIN: SeedAccount = SeedAccount {
    name: "Demo Platform Administrator",
    email: "admin@demo.test",
    address: "1 Admin Plaza",
    role: Role::Admin,
};

const OWNER: SeedAccount = SeedAccount {
    name: "Jane Demo Store Owner Account",
    email: "jane@demo.test",
    address: "2 Market Street",
    role: Role::StoreOwner,
};

const RATER: SeedAccount = SeedAccount {
    name: "Bob Demo Regular Customer",
    email: "bob@demo.test",
    address: "3 Elm Avenue",
    role: Role::User,
};

/// Seed the demo dataset.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn run() -> Result<(), CommandError> {
    let raw_password =
        std::env::var("SR_SEED_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_owned());
    let password =
        Password::parse(&raw_password).map_err(|e| CommandError::invalid("password", e))?;
    let password_hash = hash_password(password.expose())?;

    let pool = connect().await?;

    ensure_account(&pool, &ADMIN, &password_hash).await?;
    let owner = ensure_account(&pool, &OWNER, &password_hash).await?;
    let rater = ensure_account(&pool, &RATER, &password_hash).await?;
    let store = ensure_store(&pool, &owner).await?;

    let value = RatingValue::new(4).map_err(|e| CommandError::invalid("rating", e))?;
    RatingRepository::new(&pool)
        .upsert(rater.id, store, value)
        .await?;

    tracing::info!(
        admin = ADMIN.email,
        owner = OWNER.email,
        user = RATER.email,
        store_id = %store,
        "Seed complete"
    );
    Ok(())
}

async fn ensure_account(
    pool: &PgPool,
    account: &SeedAccount,
    password_hash: &str,
) -> Result<User, CommandError> {
    let users = UserRepository::new(pool);
    let email = Email::parse(account.email).map_err(|e| CommandError::invalid("email", e))?;

    if let Some(existing) = users.get_by_email(&email).await? {
        tracing::info!(email = account.email, "Account exists, skipping");
        return Ok(existing);
    }

    let name = PersonName::parse(account.name).map_err(|e| CommandError::invalid("name", e))?;
    let address =
        PostalAddress::parse(account.address).map_err(|e| CommandError::invalid("address", e))?;
    let user = users
        .create(&name, &email, password_hash, &address, account.role)
        .await?;

    tracing::info!(email = account.email, role = %account.role, "Account created");
    Ok(user)
}

async fn ensure_store(pool: &PgPool, owner: &User) -> Result<StoreId, CommandError> {
    let stores = StoreRepository::new(pool);
    let email = Email::parse("shop@demo.test").map_err(|e| CommandError::invalid("email", e))?;

    let owned = stores.list(&StoreQuery::owned_by(owner.id)).await?;
    if let Some(existing) = owned.iter().find(|s| s.email == email) {
        tracing::info!(store_id = %existing.id, "Store exists, skipping");
        return Ok(existing.id);
    }

    let store = NewStore {
        name: StoreName::parse("Jane's Corner Demo Shop")
            .map_err(|e| CommandError::invalid("name", e))?,
        email,
        address: PostalAddress::parse("2 Market Street, Unit B")
            .map_err(|e| CommandError::invalid("address", e))?,
        owner_id: owner.id,
    };
    Ok(stores.create(&store).await?)
}
