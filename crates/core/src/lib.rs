//! Star Rating Core - Shared domain types.
//!
//! This crate provides the types used across all Star Rating components:
//! - `api` - JSON HTTP server (users, stores, ratings)
//! - `cli` - Command-line tools for migrations, seeding and bootstrap admins
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no
//! database access, no HTTP. Every value that crosses the API boundary is
//! parsed into one of these types before it reaches storage.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, validated text fields, roles, rating values and sort keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
