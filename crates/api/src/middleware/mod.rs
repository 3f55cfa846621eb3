//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//!
//! Authentication is an extractor ([`Caller`]), not a layer, so each
//! handler states which [`Action`](crate::services::policy::Action) it performs.

pub mod auth;
pub mod request_id;

pub use auth::Caller;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
