//! Star Rating API library.
//!
//! A role-based store rating service: users register and rate stores 1-5,
//! store owners read the aggregates for their stores, and admins manage
//! accounts and stores. The HTTP surface lives in [`routes`]; the binary in
//! `main.rs` only wires configuration, telemetry and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use routes::app;
pub use state::AppState;
