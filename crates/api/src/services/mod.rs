//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Account creation, password login, session tokens
//! - `policy` - Which roles may perform which actions
//! - `stores` - Store creation and store-scoped reads

pub mod auth;
pub mod policy;
pub mod stores;
