//! Public routes for OTP login.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST /otp    -> request_otp
/// POST /login  -> login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/otp", post(auth::request_otp))
        .route("/login", post(auth::login))
}
