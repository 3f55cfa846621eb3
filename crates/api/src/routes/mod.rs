//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (database ping)
//!
//! # Auth (public)
//! POST /api/auth/register           - Self-registration (role = user)
//! POST /api/auth/login              - Password login, returns a bearer token
//!
//! # Users
//! GET  /api/users                   - List users (admin)
//! POST /api/users                   - Create user with any role (admin)
//! GET  /api/users/profile           - Own profile
//! PUT  /api/users/profile           - Update own name/address
//! PUT  /api/users/password          - Change own password
//!
//! # Stores
//! GET  /api/stores                  - List stores with aggregates (admin, user)
//! POST /api/stores                  - Create store (admin, store_owner)
//! GET  /api/stores/owner            - Own stores with aggregates (store_owner)
//! GET  /api/stores/{id}             - One store with aggregates
//!
//! # Ratings
//! POST /api/ratings                 - Submit or update a rating (user)
//! GET  /api/ratings/user            - Own ratings
//! GET  /api/ratings/store/{id}      - Ratings on one store (admin, owning store_owner)
//! GET  /api/ratings/stats           - Dashboard counts (admin)
//! ```

pub mod auth;
pub mod health;
pub mod ratings;
pub mod stores;
pub mod users;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// JSON body extractor whose rejections are `AppError`s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections are `AppError`s.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor whose rejections are `AppError`s.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// An extractor whose rejection the handler surfaces only after the caller's
/// role has been checked, so a forbidden caller sees 403 whatever they sent.
pub type Deferred<T> = std::result::Result<T, AppError>;

/// A trimmed query parameter, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/profile", get(users::profile).put(users::update_profile))
        .route("/password", put(users::change_password))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index).post(stores::create))
        .route("/owner", get(stores::owned))
        .route("/{id}", get(stores::show))
}

/// Create the rating routes router.
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::submit))
        .route("/user", get(ratings::mine))
        .route("/store/{id}", get(ratings::for_store))
        .route("/stats", get(ratings::stats))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/stores", store_routes())
        .nest("/ratings", rating_routes())
}

/// Build the complete application: routes, health checks and middleware.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS policy: any origin when none are configured, otherwise the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}
