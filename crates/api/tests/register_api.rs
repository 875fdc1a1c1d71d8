//! HTTP-level integration tests for `POST /api/register`.

mod common;

use apna_db::repositories::UserRepo;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{archive_user, body_json, post_json, post_json_auth, seed_session_token, seed_user};
use sqlx::PgPool;
use tower::ServiceExt;

/// Seed an admin account and return a bearer token for it.
async fn admin_token(pool: &PgPool) -> (i64, String) {
    let admin = seed_user(pool, "Admin", "admin@example.com", "+919123456789").await;
    let (_, token) = seed_session_token(pool, &admin).await;
    (admin.id, token)
}

fn registration(name: &str, email: &str, phone: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "email": email, "mobilenumber": phone })
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/register",
        registration("Asha", "asha@example.com", "9876543210"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_user_with_normalised_fields(pool: PgPool) {
    let (admin_id, token) = admin_token(&pool).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app,
        "/api/register",
        registration("  Asha Rao ", "Asha@Example.com", "9876543210"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "success");
    let user_id = json["userId"].as_i64().expect("userId should be a number");

    let user = UserRepo::find_active_by_id(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.fullname, "Asha Rao");
    assert_eq!(user.email, "asha@example.com");
    assert_eq!(user.mobilenumber, "+919876543210");
    assert_eq!(user.created_by, Some(admin_id));
    assert!(user.otp.is_none());

    let profile = UserRepo::find_profile(&pool, user_id).await.unwrap();
    assert!(profile.is_some(), "profile row should be created alongside the user");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_in_other_case_conflicts(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    seed_user(&pool, "Asha", "user@example.com", "+919876543210").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/register",
        registration("Other", "User@Example.com", "9876500000"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_phone_in_other_format_conflicts(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;

    let first = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/register",
        registration("Asha", "asha@example.com", "9876543210"),
        &token,
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(
        common::build_test_app(pool),
        "/api/register",
        registration("Ravi", "ravi@example.com", "+91 98765 43210"),
        &token,
    )
    .await;

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["error"].as_str().unwrap().contains("phone number"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archived_user_email_can_be_registered_again(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let old = seed_user(&pool, "Asha", "asha@example.com", "+919876543210").await;
    archive_user(&pool, old.id).await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/register",
        registration("Asha", "asha@example.com", "9876543210"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_fields_are_rejected(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;

    let cases = [
        registration("Asha", "", "9876543210"),
        registration("   ", "asha@example.com", "9876543210"),
        registration("Asha", "not-an-email", "9876543210"),
        registration("Asha", "asha@example.com", ""),
        registration("Asha", "asha@example.com", "12345"),
        registration("Asha", "asha@example.com", "phone"),
    ];

    for body in cases {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/register",
            body.clone(),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR", "body {body}");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "only the admin should exist");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_body_is_rejected(pool: PgPool) {
    let (_, token) = admin_token(&pool).await;
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/register")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Error parsing request");
}
