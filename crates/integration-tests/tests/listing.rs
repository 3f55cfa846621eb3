//! Store and user listings: search, sorting and rating aggregates.
//!
//! Requires a `PostgreSQL` server reachable through `DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;

use star_rating_core::Role;
use star_rating_integration_tests::TestApp;

/// Three stores owned by Olivia rated {2, 3}, {5} and not at all, plus an
/// owner with no stores.
struct Catalog {
    app: TestApp,
    admin: String,
    user: String,
}

async fn catalog(pool: PgPool) -> Catalog {
    let app = TestApp::spawn(pool).await;
    let (_, admin) = app
        .account_with_token("Platform Administrator One", "admin@example.com", Role::Admin)
        .await;
    let olivia = app
        .create_account("Olivia Owner Of The Shops", "olivia@example.com", Role::StoreOwner)
        .await;
    app.create_account("Lonely Owner Without Stores", "lonely@example.com", Role::StoreOwner)
        .await;
    let (_, user) = app
        .account_with_token("Regular Platform User Name", "user@example.com", Role::User)
        .await;
    let (_, second) = app
        .account_with_token("Second Platform User Name", "second@example.com", Role::User)
        .await;

    let alpha = app
        .create_store(&admin, "Alpha 500 Outlet Center", "alpha@example.com", olivia)
        .await;
    let beta = app
        .create_store(&admin, "Beta 50% Off Bargain Bin", "beta@example.com", olivia)
        .await;
    app.create_store(&admin, "Gamma General Goods Store", "gamma@example.com", olivia)
        .await;

    assert_eq!(app.rate(&user, alpha, 2).await, StatusCode::CREATED);
    assert_eq!(app.rate(&second, alpha, 3).await, StatusCode::CREATED);
    assert_eq!(app.rate(&user, beta, 5).await, StatusCode::CREATED);

    Catalog { app, admin, user }
}

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect()
}

fn find<'a>(list: &'a Value, key: &str, value: &str) -> &'a Value {
    list.as_array()
        .unwrap()
        .iter()
        .find(|row| row[key] == value)
        .unwrap()
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_store_list_reports_aggregates(pool: PgPool) {
    let Catalog { app, user, .. } = catalog(pool).await;

    let stores = app.get_json("/api/stores", &user).await;
    assert_eq!(
        names(&stores),
        ["Alpha 500 Outlet Center", "Beta 50% Off Bargain Bin", "Gamma General Goods Store"]
    );

    let alpha = find(&stores, "name", "Alpha 500 Outlet Center");
    assert_eq!(alpha["average_rating"].as_f64(), Some(2.5));
    assert_eq!(alpha["total_ratings"], 2);
    assert_eq!(alpha["owner_name"], "Olivia Owner Of The Shops");

    let gamma = find(&stores, "name", "Gamma General Goods Store");
    assert_eq!(gamma["average_rating"].as_f64(), Some(0.0));
    assert_eq!(gamma["total_ratings"], 0);
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_store_list_sorts_by_average_descending(pool: PgPool) {
    let Catalog { app, user, .. } = catalog(pool).await;

    let stores = app
        .get_json("/api/stores?sortBy=average_rating&sortOrder=DESC", &user)
        .await;
    assert_eq!(
        names(&stores),
        ["Beta 50% Off Bargain Bin", "Alpha 500 Outlet Center", "Gamma General Goods Store"]
    );

    let stores = app
        .get_json("/api/stores?sortBy=total_ratings&sortOrder=asc", &user)
        .await;
    assert_eq!(names(&stores)[0], "Gamma General Goods Store");
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_store_list_rejects_unknown_sort_column(pool: PgPool) {
    let Catalog { app, user, .. } = catalog(pool).await;

    let resp = app
        .request(Method::GET, "/api/stores?sortBy=owner_id;DROP", Some(&user), None)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "sortBy");
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_store_search_matches_owner_name_case_insensitively(pool: PgPool) {
    let Catalog { app, user, .. } = catalog(pool).await;

    let stores = app.get_json("/api/stores?search=oLIVIA", &user).await;
    assert_eq!(stores.as_array().map(Vec::len), Some(3));

    let stores = app.get_json("/api/stores?search=GAMMA", &user).await;
    assert_eq!(names(&stores), ["Gamma General Goods Store"]);

    let stores = app.get_json("/api/stores?search=nobody-matches-this", &user).await;
    assert_eq!(stores, json!([]));
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_store_search_treats_wildcards_literally(pool: PgPool) {
    let Catalog { app, user, .. } = catalog(pool).await;

    // "50%" must not act as the pattern "50" followed by anything.
    let stores = app.get_json("/api/stores?search=50%25", &user).await;
    assert_eq!(names(&stores), ["Beta 50% Off Bargain Bin"]);

    let stores = app.get_json("/api/stores?search=_", &user).await;
    assert_eq!(stores, json!([]));
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_user_list_averages_only_for_store_owners(pool: PgPool) {
    let Catalog { app, admin, .. } = catalog(pool).await;

    let users = app.get_json("/api/users", &admin).await;
    assert_eq!(users.as_array().map(Vec::len), Some(5));

    let olivia = find(&users, "email", "olivia@example.com");
    let average = olivia["average_rating"].as_f64().unwrap();
    assert!((average - 10.0 / 3.0).abs() < 1e-9, "got {average}");

    let lonely = find(&users, "email", "lonely@example.com");
    assert_eq!(lonely["average_rating"].as_f64(), Some(0.0));

    for email in ["admin@example.com", "user@example.com", "second@example.com"] {
        assert!(find(&users, "email", email)["average_rating"].is_null(), "{email}");
    }
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_user_list_search_and_sort(pool: PgPool) {
    let Catalog { app, admin, .. } = catalog(pool).await;

    let users = app.get_json("/api/users?search=PLATFORM", &admin).await;
    assert_eq!(
        names(&users),
        ["Platform Administrator One", "Regular Platform User Name", "Second Platform User Name"]
    );

    let users = app
        .get_json("/api/users?search=platform&sortBy=name&sortOrder=desc", &admin)
        .await;
    assert_eq!(names(&users)[0], "Second Platform User Name");

    let resp = app
        .request(Method::GET, "/api/users?role=superuser", Some(&admin), None)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_jane_and_bob_through_the_api(pool: PgPool) {
    let app = TestApp::spawn(pool).await;
    let (_, admin) = app
        .account_with_token("Platform Administrator One", "admin@example.com", Role::Admin)
        .await;

    let resp = app
        .request(
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(json!({
                "name": "Jane Store Owner Account",
                "email": "jane@x.com",
                "password": "Secret!Pass1",
                "address": "4 Shop Lane",
                "role": "store_owner",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let jane = created["id"].as_i64().unwrap();

    let resp = app
        .request(
            Method::POST,
            "/api/stores",
            Some(&admin),
            Some(json!({
                "name": "Jane's Shop On Main Street",
                "email": "shop@x.com",
                "address": "4 Shop Lane",
                "user_id": jane,
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Bob Regular Rating Customer",
                "email": "bob@x.com",
                "password": "Secret!Pass1",
                "address": "",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bob = app.login("bob@x.com").await;

    let stores = app.get_json("/api/stores", &bob).await;
    let store_id = stores[0]["id"].as_i64().unwrap();

    assert_eq!(app.rate(&bob, store_id, 4).await, StatusCode::CREATED);
    let stores = app.get_json("/api/stores", &bob).await;
    assert_eq!(stores[0]["average_rating"].as_f64(), Some(4.0));
    assert_eq!(stores[0]["total_ratings"], 1);

    assert_eq!(app.rate(&bob, store_id, 2).await, StatusCode::OK);
    let stores = app.get_json("/api/stores", &bob).await;
    assert_eq!(stores[0]["average_rating"].as_f64(), Some(2.0));
    assert_eq!(stores[0]["total_ratings"], 1);
}
