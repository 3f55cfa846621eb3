//! Store listing, creation and lookup.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use star_rating_core::{Email, PostalAddress, SortOrder, StoreId, StoreName, StoreSortField, UserId};

use super::users::CreatedResponse;
use super::{ApiJson, ApiPath, ApiQuery, Deferred, non_blank};
use crate::db::{StoreQuery, StoreRepository};
use crate::error::Result;
use crate::middleware::Caller;
use crate::models::{NewStore, StoreWithRating};
use crate::services::policy::Action;
use crate::services::stores::StoreService;
use crate::state::AppState;
use crate::validation::{ValidationErrors, integer_field};

/// Query string for the store listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl StoreListParams {
    fn validate(self) -> std::result::Result<StoreQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let sort = match non_blank(self.sort_by.as_deref()) {
            Some(raw) => errors.check("sortBy", StoreSortField::parse(raw)),
            None => Some(StoreSortField::default()),
        };
        let order = match non_blank(self.sort_order.as_deref()) {
            Some(raw) => errors.check("sortOrder", SortOrder::parse(raw)),
            None => Some(SortOrder::default()),
        };

        let (Some(sort), Some(order)) = (sort, order) else {
            return Err(errors);
        };
        Ok(StoreQuery {
            search: self.search,
            sort,
            order,
            ..StoreQuery::default()
        })
    }
}

/// List every store with its rating aggregates.
///
/// GET /api/stores?search=&sortBy=&sortOrder=
///
/// # Errors
///
/// 403 for store owners; 400 on an unknown sort column or direction.
pub async fn index(
    State(state): State<AppState>,
    caller: Caller,
    query: Deferred<ApiQuery<StoreListParams>>,
) -> Result<Json<Vec<StoreWithRating>>> {
    caller.require(Action::ListStores)?;
    let ApiQuery(params) = query?;
    let query = params.validate()?;
    let stores = StoreRepository::new(state.pool()).list(&query).await?;
    Ok(Json(stores))
}

/// The caller's own stores with their rating aggregates.
///
/// GET /api/stores/owner
///
/// # Errors
///
/// 403 unless store owner.
pub async fn owned(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<StoreWithRating>>> {
    let identity = caller.require(Action::ListOwnedStores)?;
    let stores = StoreRepository::new(state.pool())
        .list(&StoreQuery::owned_by(identity.id))
        .await?;
    Ok(Json(stores))
}

/// One store with its rating aggregates.
///
/// GET /api/stores/{id}
///
/// # Errors
///
/// 404 if absent; 403 if a store owner asks for someone else's store.
pub async fn show(
    State(state): State<AppState>,
    caller: Caller,
    path: Deferred<ApiPath<i32>>,
) -> Result<Json<StoreWithRating>> {
    let identity = caller.require(Action::ViewStore)?;
    let ApiPath(id) = path?;
    let store = StoreService::new(state.pool())
        .view(&identity, StoreId::new(id))
        .await?;
    Ok(Json(store))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub user_id: Option<serde_json::Value>,
}

/// Create a store.
///
/// POST /api/stores
///
/// Admins must pass `user_id` naming a store owner; a store owner always
/// owns the store they create and `user_id` is ignored.
///
/// # Errors
///
/// 403 for plain users; 400 on validation failure, a bad owner, or a
/// duplicate store email.
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    body: Deferred<ApiJson<CreateStoreRequest>>,
) -> Result<(StatusCode, Json<CreatedResponse<StoreId>>)> {
    let identity = caller.require(Action::CreateStore)?;
    let ApiJson(req) = body?;

    let mut errors = ValidationErrors::new();
    let name = errors.check("name", StoreName::parse(&req.name));
    let email = errors.check("email", Email::parse(&req.email));
    let address = errors.check("address", PostalAddress::parse(&req.address));
    let requested_owner = match req.user_id.as_ref().filter(|v| !v.is_null()) {
        Some(value) => errors
            .check(
                "user_id",
                integer_field(value)
                    .and_then(|id| i32::try_from(id).map_err(|_| "is out of range")),
            )
            .map(|id| Some(UserId::new(id))),
        None => Some(None),
    };
    let (Some(name), Some(email), Some(address), Some(requested_owner)) =
        (name, email, address, requested_owner)
    else {
        return Err(errors.into());
    };

    let stores = StoreService::new(state.pool());
    let owner_id = stores.resolve_owner(&identity, requested_owner).await?;
    let id = stores
        .create(&NewStore {
            name,
            email,
            address,
            owner_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Store created successfully",
            id,
        }),
    ))
}
