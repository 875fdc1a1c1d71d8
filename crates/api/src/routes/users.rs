//! Routes that require an authenticated session.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// POST /register  -> register
/// GET  /me        -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/me", get(users::me))
}
