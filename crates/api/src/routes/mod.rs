pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /otp         request an OTP (public)
/// /login       exchange email + OTP for a token (public)
/// /register    create a user (requires auth)
/// /me          current identity (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(auth::router()).merge(users::router())
}
