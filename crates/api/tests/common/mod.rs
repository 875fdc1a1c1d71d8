#![allow(dead_code)]

use std::sync::Arc;

use apna_api::auth::jwt::{issue_token, JwtConfig};
use apna_api::config::{OtpConfig, ServerConfig};
use apna_api::mail::{MailConfig, OtpMailer};
use apna_api::router::build_app_router;
use apna_api::state::AppState;
use apna_core::phone::{parse_region, DEFAULT_REGION};
use apna_core::session::{extended_end_time, DeviceMetadata};
use apna_db::models::session::CreateSession;
use apna_db::models::user::{CreateUser, User};
use apna_db::repositories::{SessionRepo, UserRepo};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-signing-secret";

/// Build a test `ServerConfig` with safe defaults and no SMTP.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            token_expiry_mins: 60,
        },
        session_window_mins: 60,
        otp: OtpConfig {
            length: 6,
            ttl_mins: 10,
        },
        phone_region: parse_region(DEFAULT_REGION).unwrap(),
        mail: None,
    }
}

/// Build the full application router over `pool`, with the same middleware
/// stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, None)
}

/// Like [`build_test_app`], but delivering OTPs through `mail`.
pub fn build_test_app_with_mail(pool: PgPool, mail: MailConfig) -> Router {
    build_app(pool, Some(Arc::new(OtpMailer::new(mail))))
}

fn build_app(pool: PgPool, mailer: Option<Arc<OtpMailer>>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body.to_string())).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body.to_string())).await
}

/// Send a GET with a raw `Authorization` header value.
pub async fn get_with_authorization(app: Router, uri: &str, value: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", value)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user (with profile) directly in the database.
pub async fn seed_user(pool: &PgPool, name: &str, email: &str, phone: &str) -> User {
    UserRepo::create_with_profile(
        pool,
        &CreateUser {
            fullname: name.to_string(),
            email: email.to_string(),
            mobilenumber: phone.to_string(),
            created_by: None,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Soft-delete a user the way an operator would, straight in SQL.
pub async fn archive_user(pool: &PgPool, user_id: i64) {
    sqlx::query("UPDATE users SET archived_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("archiving should succeed");
}

/// Current `end_time` of the session with `token`.
pub async fn session_end_time(pool: &PgPool, user_id: i64, token: Uuid) -> DateTime<Utc> {
    SessionRepo::list_for_user(pool, user_id)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.token == token)
        .expect("session should exist")
        .end_time
}

/// Store `otp` for `email`, valid for ten minutes.
pub async fn seed_otp(pool: &PgPool, email: &str, otp: &str) {
    let stored = UserRepo::store_otp(pool, email, otp, Utc::now() + Duration::minutes(10))
        .await
        .expect("storing otp should succeed");
    assert!(stored, "otp should be stored for {email}");
}

/// Create a live session for `user` and sign a token for it, bypassing login.
pub async fn seed_session_token(pool: &PgPool, user: &User) -> (Uuid, String) {
    let config = test_config();
    let device = DeviceMetadata {
        platform: "android".to_string(),
        ..Default::default()
    };
    let session = SessionRepo::create(
        pool,
        &CreateSession {
            user_id: user.id,
            token: Uuid::new_v4(),
            end_time: extended_end_time(Utc::now(), config.session_window_mins),
            device: device.clone(),
        },
    )
    .await
    .expect("session creation should succeed");

    let profile = UserRepo::find_profile(pool, user.id)
        .await
        .unwrap()
        .expect("profile should exist");
    let token = issue_token(&profile, session.token, &device, &config.jwt).unwrap();
    (session.token, token)
}

/// Log in through the API and return the response JSON.
pub async fn login(app: Router, email: &str, otp: &str) -> Response<Body> {
    let body = serde_json::json!({
        "platform": "android",
        "modelName": "Pixel 8",
        "osVersion": "14",
        "deviceId": "device-1",
        "email": email,
        "otp": otp,
    });
    post_json(app, "/api/login", body).await
}
