//! Registration, login and password changes against a real database.
//!
//! Requires a `PostgreSQL` server reachable through `DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;

use star_rating_integration_tests::{PASSWORD, TestApp};

fn registration(email: &str) -> Value {
    json!({
        "name": "Jane Quinn Alexandra Doe",
        "email": email,
        "password": PASSWORD,
        "address": "12 Orchard Road",
    })
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_register_then_login_returns_user_role(pool: PgPool) {
    let app = TestApp::spawn(pool).await;

    let resp = app
        .request(Method::POST, "/api/auth/register", None, Some(registration("jane@example.com")))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "User registered successfully");

    let resp = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["email"], "jane@example.com");
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_register_ignores_requested_role(pool: PgPool) {
    let app = TestApp::spawn(pool).await;

    let mut body = registration("sneaky@example.com");
    body["role"] = json!("admin");
    let resp = app.request(Method::POST, "/api/auth/register", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let token = app.login("sneaky@example.com").await;
    let resp = app.request(Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_duplicate_registration_is_rejected(pool: PgPool) {
    let app = TestApp::spawn(pool).await;

    let first = app
        .request(Method::POST, "/api/auth/register", None, Some(registration("dup@example.com")))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(Method::POST, "/api/auth/register", None, Some(registration("dup@example.com")))
        .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["message"], "Email already registered");

    // The original account is untouched.
    app.login("dup@example.com").await;
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_login_failures_share_one_message(pool: PgPool) {
    let app = TestApp::spawn(pool).await;
    app.create_account("Known Account Holder Name", "known@example.com", star_rating_core::Role::User)
        .await;

    for (email, password) in [
        ("known@example.com", "Wrong!Pass1"),
        ("nobody@example.com", PASSWORD),
    ] {
        let resp = app
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_change_password(pool: PgPool) {
    let app = TestApp::spawn(pool).await;
    let (_, token) = app
        .account_with_token("Password Changing Person", "pw@example.com", star_rating_core::Role::User)
        .await;

    let wrong = app
        .request(
            Method::PUT,
            "/api/users/password",
            Some(&token),
            Some(json!({ "currentPassword": "Wrong!Pass1", "newPassword": "Fresh!Pass2" })),
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["message"], "Current password is incorrect");

    let ok = app
        .request(
            Method::PUT,
            "/api/users/password",
            Some(&token),
            Some(json!({ "currentPassword": PASSWORD, "newPassword": "Fresh!Pass2" })),
        )
        .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let resp = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "pw@example.com", "password": "Fresh!Pass2" })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_profile_read_and_update(pool: PgPool) {
    let app = TestApp::spawn(pool).await;
    let (id, token) = app
        .account_with_token("Profile Owning Person Name", "me@example.com", star_rating_core::Role::StoreOwner)
        .await;

    let profile = app.get_json("/api/users/profile", &token).await;
    assert_eq!(profile["id"], id.as_i32());
    assert_eq!(profile["email"], "me@example.com");
    assert_eq!(profile["role"], "store_owner");
    assert!(profile.get("password_hash").is_none());
    assert!(profile.get("password").is_none());

    let resp = app
        .request(
            Method::PUT,
            "/api/users/profile",
            Some(&token),
            Some(json!({
                "name": "Renamed Profile Owner Person",
                "address": "99 New Address Road",
                "email": "hijack@example.com",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let profile = app.get_json("/api/users/profile", &token).await;
    assert_eq!(profile["name"], "Renamed Profile Owner Person");
    assert_eq!(profile["address"], "99 New Address Road");
    assert_eq!(profile["email"], "me@example.com");
    assert_eq!(profile["role"], "store_owner");
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_profile_update_validates_fields(pool: PgPool) {
    let app = TestApp::spawn(pool).await;
    let (_, token) = app
        .account_with_token("Profile Owning Person Name", "me@example.com", star_rating_core::Role::User)
        .await;

    let resp = app
        .request(
            Method::PUT,
            "/api/users/profile",
            Some(&token),
            Some(json!({ "name": "Too Short", "address": "1 Road" })),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "name");

    let profile = app.get_json("/api/users/profile", &token).await;
    assert_eq!(profile["name"], "Profile Owning Person Name");
}

#[sqlx::test(migrator = "star_rating_api::db::MIGRATOR")]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn test_profile_of_deleted_account_is_not_found(pool: PgPool) {
    let app = TestApp::spawn(pool).await;
    let (id, token) = app
        .account_with_token("Soon Deleted Person Name", "gone@example.com", star_rating_core::Role::User)
        .await;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id.as_i32())
        .execute(&app.pool)
        .await
        .unwrap();

    let resp = app.request(Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
