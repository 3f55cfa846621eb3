//! Bearer token extractor.
//!
//! The caller's identity is rebuilt from the `Authorization: Bearer <token>`
//! header on every request. Handlers then hand it to
//! [`policy::authorize`](crate::services::policy::authorize).

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::Identity;
use crate::services::policy::{self, Action};
use crate::state::AppState;

/// The verified caller, or `None` when no usable token was sent.
///
/// Missing, malformed, tampered and expired tokens are all treated the same:
/// the request proceeds anonymously and protected actions answer 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(caller: Caller) -> Result<Json<User>, AppError> {
///     let identity = caller.require(Action::ViewProfile)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    /// Authorize `action` for this caller and return their identity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Policy` with `Unauthenticated` when there is no
    /// caller, or `Forbidden` when their role may not perform `action`.
    pub fn require(self, action: Action) -> Result<Identity, AppError> {
        policy::authorize(action, self.0.as_ref())?;
        self.0
            .ok_or(AppError::Policy(policy::PolicyError::Unauthenticated))
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_token(&parts.headers).and_then(|token| {
            state
                .tokens()
                .verify(token)
                .inspect(|identity| set_sentry_user(&identity.id))
                .ok()
        });

        Ok(Self(identity))
    }
}

/// The token from an `Authorization: Bearer` header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
