//! Account administration and the caller's own profile.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use star_rating_core::{
    Password, PersonName, PostalAddress, Role, SortOrder, UserId, UserSortField,
};

use super::auth::AccountForm;
use super::{ApiJson, ApiQuery, Deferred, non_blank};
use crate::db::{UserQuery, UserRepository};
use crate::error::Result;
use crate::middleware::Caller;
use crate::models::{NewAccount, User, UserSummary};
use crate::services::auth::AuthService;
use crate::services::policy::Action;
use crate::state::AppState;
use crate::validation::ValidationErrors;

/// Query string for the user listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub search: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl UserListParams {
    fn validate(self) -> std::result::Result<UserQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let role = match non_blank(self.role.as_deref()) {
            Some(raw) => errors.check("role", raw.parse::<Role>()).map(Some),
            None => Some(None),
        };
        let sort = match non_blank(self.sort_by.as_deref()) {
            Some(raw) => errors.check("sortBy", UserSortField::parse(raw)),
            None => Some(UserSortField::default()),
        };
        let order = match non_blank(self.sort_order.as_deref()) {
            Some(raw) => errors.check("sortOrder", SortOrder::parse(raw)),
            None => Some(SortOrder::default()),
        };

        let (Some(role), Some(sort), Some(order)) = (role, sort, order) else {
            return Err(errors);
        };
        Ok(UserQuery {
            search: self.search,
            role,
            sort,
            order,
        })
    }
}

/// List accounts.
///
/// GET /api/users?search=&role=&sortBy=&sortOrder=
///
/// # Errors
///
/// 403 unless admin; 400 on an unknown role, sort column or direction.
pub async fn index(
    State(state): State<AppState>,
    caller: Caller,
    query: Deferred<ApiQuery<UserListParams>>,
) -> Result<Json<Vec<UserSummary>>> {
    caller.require(Action::ListUsers)?;
    let ApiQuery(params) = query?;
    let query = params.validate()?;
    let users = UserRepository::new(state.pool()).list(&query).await?;
    Ok(Json(users))
}

/// Admin account creation: the account fields plus a role.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub account: AccountForm,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse<Id> {
    pub message: &'static str,
    pub id: Id,
}

/// Create an account with any role.
///
/// POST /api/users
///
/// # Errors
///
/// 403 unless admin; 400 on validation failure or duplicate email.
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: Deferred<ApiJson<CreateUserRequest>>,
) -> Result<(StatusCode, Json<CreatedResponse<UserId>>)> {
    caller.require(Action::CreateUser)?;
    let ApiJson(req) = body?;

    let role = req
        .role
        .as_deref()
        .map_or(Ok(Role::User), |raw| raw.trim().parse::<Role>());
    let (account, role) = match (req.account.validate(Role::User), role) {
        (Ok(account), Ok(role)) => (account, role),
        (account, role) => {
            let mut errors = account.err().unwrap_or_default();
            if let Err(e) = role {
                errors.push("role", e.to_string());
            }
            return Err(errors.into());
        }
    };

    let user = AuthService::new(state.pool(), state.tokens())
        .create_account(NewAccount { role, ..account })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "User created successfully",
            id: user.id,
        }),
    ))
}

/// The caller's own account.
///
/// GET /api/users/profile
///
/// # Errors
///
/// 404 if the account behind the token was deleted.
pub async fn profile(State(state): State<AppState>, caller: Caller) -> Result<Json<User>> {
    let identity = caller.require(Action::ViewProfile)?;
    let user = AuthService::new(state.pool(), state.tokens())
        .profile(identity.id)
        .await?;
    Ok(Json(user))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub address: String,
}

/// Update the caller's name and address.
///
/// PUT /api/users/profile
///
/// # Errors
///
/// 400 on validation failure; 404 if the account was deleted.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: Caller,
    body: Deferred<ApiJson<UpdateProfileRequest>>,
) -> Result<Json<User>> {
    let identity = caller.require(Action::UpdateProfile)?;
    let ApiJson(req) = body?;

    let mut errors = ValidationErrors::new();
    let name = errors.check("name", PersonName::parse(&req.name));
    let address = errors.check("address", PostalAddress::parse(&req.address));
    let (Some(name), Some(address)) = (name, address) else {
        return Err(errors.into());
    };

    let user = AuthService::new(state.pool(), state.tokens())
        .update_profile(identity.id, &name, &address)
        .await?;
    Ok(Json(user))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct PasswordChanged {
    pub message: &'static str,
}

/// Change the caller's password.
///
/// PUT /api/users/password
///
/// # Errors
///
/// 400 if the new password breaks the policy or the current one is wrong.
pub async fn change_password(
    State(state): State<AppState>,
    caller: Caller,
    body: Deferred<ApiJson<ChangePasswordRequest>>,
) -> Result<Json<PasswordChanged>> {
    let identity = caller.require(Action::ChangePassword)?;
    let ApiJson(req) = body?;

    let mut errors = ValidationErrors::new();
    if req.current_password.is_empty() {
        errors.push("currentPassword", "is required");
    }
    let new_password = errors.check("newPassword", Password::parse(&req.new_password));
    let Some(new_password) = new_password.filter(|_| errors.is_empty()) else {
        return Err(errors.into());
    };

    AuthService::new(state.pool(), state.tokens())
        .change_password(identity.id, &req.current_password, &new_password)
        .await?;

    Ok(Json(PasswordChanged {
        message: "Password updated successfully",
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use super::*;
    use crate::routes::tests::{json_body, send, test_state, token_for};

    #[test]
    fn test_listing_defaults() {
        let query = UserListParams::default().validate().unwrap();
        assert_eq!(query.sort, UserSortField::Name);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.role, None);
    }

    #[test]
    fn test_listing_parses_filters() {
        let query = UserListParams {
            search: Some("jane".to_owned()),
            role: Some("store_owner".to_owned()),
            sort_by: Some("email".to_owned()),
            sort_order: Some("DESC".to_owned()),
        }
        .validate()
        .unwrap();
        assert_eq!(query.role, Some(Role::StoreOwner));
        assert_eq!(query.sort, UserSortField::Email);
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn test_listing_rejects_unknown_values() {
        let errors = UserListParams {
            role: Some("root".to_owned()),
            sort_by: Some("password_hash".to_owned()),
            sort_order: Some("sideways".to_owned()),
            ..UserListParams::default()
        }
        .validate()
        .unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["role", "sortBy", "sortOrder"]);
    }

    #[tokio::test]
    async fn test_unknown_sort_column_is_rejected_before_database() {
        let state = test_state();
        let admin = token_for(&state, Role::Admin);
        let response = send(
            &state,
            Method::GET,
            "/api/users?sortBy=name;DROP%20TABLE%20users",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errors"][0]["field"], "sortBy");
    }

    #[tokio::test]
    async fn test_create_user_rejects_unknown_role() {
        let state = test_state();
        let admin = token_for(&state, Role::Admin);
        let response = send(
            &state,
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(json!({
                "name": "Jane Store Owner Example",
                "email": "jane@x.com",
                "password": "Secret!Pass1",
                "address": "2 High Street",
                "role": "superuser",
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errors"][0]["field"], "role");
    }

    #[tokio::test]
    async fn test_change_password_validates_new_password() {
        let state = test_state();
        let user = token_for(&state, Role::User);
        let response = send(
            &state,
            Method::PUT,
            "/api/users/password",
            Some(&user),
            Some(json!({ "currentPassword": "Secret!Pass1", "newPassword": "short" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errors"][0]["field"], "newPassword");
    }
}
