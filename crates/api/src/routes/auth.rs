//! Registration and login.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use star_rating_core::{Email, Password, PersonName, PostalAddress, Role, UserId};

use super::ApiJson;
use crate::error::Result;
use crate::models::NewAccount;
use crate::services::auth::AuthService;
use crate::state::AppState;
use crate::validation::ValidationErrors;

/// Account fields shared by self-registration and admin creation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

impl AccountForm {
    /// Validate every field, reporting all failures together.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self, role: Role) -> std::result::Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check("name", PersonName::parse(&self.name));
        let email = errors.check("email", Email::parse(&self.email));
        let password = errors.check("password", Password::parse(&self.password));
        let address = errors.check("address", PostalAddress::parse(&self.address));

        let (Some(name), Some(email), Some(password), Some(address)) =
            (name, email, password, address)
        else {
            return Err(errors);
        };
        Ok(NewAccount {
            name,
            email,
            password,
            address,
            role,
        })
    }
}

/// Plain `{message}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Register a new `user` account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// 400 on validation failure or an already registered email.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<AccountForm>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let account = form.validate(Role::User)?;
    AuthService::new(state.pool(), state.tokens())
        .register(account)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

/// Login request. Fields are not format-checked.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The account summary returned with a token.
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

/// Exchange email and password for a bearer token.
///
/// POST /api/auth/login
///
/// # Errors
///
/// 400 `Invalid credentials` for any mismatch.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .login(&req.email, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        user: LoginUser {
            id: session.user.id,
            name: session.user.name,
            email: session.user.email,
            role: session.user.role,
        },
    }))
}
