//! Core types for the store rating service.
//!
//! This module provides type-safe wrappers for the domain concepts that
//! carry validation rules.

pub mod email;
pub mod id;
pub mod password;
pub mod rating;
pub mod role;
pub mod sort;
pub mod text;

pub use email::{Email, EmailError};
pub use id::*;
pub use password::{Password, PasswordError};
pub use rating::{RatingValue, RatingValueError};
pub use role::{Role, RoleParseError};
pub use sort::{SortError, SortOrder, StoreSortField, UserSortField};
pub use text::{PersonName, PostalAddress, StoreName, TextError};
