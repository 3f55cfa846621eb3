//! Domain models returned by repositories and serialized by handlers.
//!
//! These are validated domain objects, separate from the internal row types
//! in [`crate::db`]. None of them carries a password hash.

pub mod rating;
pub mod store;
pub mod user;

pub use rating::{DashboardStats, Rating, StoreRating, UpsertOutcome, UserRating};
pub use store::{NewStore, StoreWithRating};
pub use user::{Identity, NewAccount, User, UserSummary};
