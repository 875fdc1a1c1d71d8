//! Session-backed authentication extractor for Axum handlers.
//!
//! A request is admitted only when all of the following hold:
//!
//! 1. `Authorization` is exactly `Bearer <token>` (scheme case-insensitive).
//! 2. The token signature and `exp` claim verify.
//! 3. The claims name a numeric user id and a session token.
//! 4. That user owns a session with the same token whose `end_time` is in
//!    the future.
//!
//! The user must also still be active. Only then is the session extended and
//! the user's current profile handed to the handler as an [`AuthUser`].
//! Database failures surface as 500, never as 401.

use apna_core::error::CoreError;
use apna_core::session::{extended_end_time, is_live};
use apna_core::types::DbId;
use apna_db::repositories::{SessionRepo, UserRepo};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user bound to a live session.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: DbId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Token of the session that admitted this request.
    pub session_token: Uuid,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// Extract the token from an `Authorization` header value.
///
/// The value must split on single spaces into exactly two parts, the first
/// being `bearer` in any case.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || token.is_empty() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let token = parse_bearer(header).ok_or_else(|| unauthorized("Invalid token"))?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Token failed verification");
            unauthorized("Invalid token")
        })?;

        let (user_id, session_token) = claims.session_ref().map_err(|e| {
            tracing::debug!(error = %e, iss = %claims.iss, "Token issuer is not a user id");
            unauthorized("Invalid token")
        })?;

        authenticate_session(state, user_id, session_token).await
    }
}

/// Check the session named by a verified token, extend it and load the user.
async fn authenticate_session(
    state: &AppState,
    user_id: DbId,
    session_token: Uuid,
) -> Result<AuthUser, AppError> {
    let now = Utc::now();

    let sessions = SessionRepo::list_for_user(&state.pool, user_id).await?;
    let live = sessions
        .iter()
        .find(|s| s.token == session_token)
        .filter(|s| is_live(s.end_time, now));

    if live.is_none() {
        tracing::info!(user_id, %session_token, "Rejected token for unknown or expired session");
        return Err(unauthorized("Invalid or expired session"));
    }

    // Archived or deactivated users lose access even with a live session,
    // and their session is left to expire.
    let profile = UserRepo::find_profile(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            tracing::info!(user_id, %session_token, "Rejected token for inactive user");
            unauthorized("User no longer exists")
        })?;

    let end_time = extended_end_time(now, state.config.session_window_mins);
    SessionRepo::touch(&state.pool, session_token, end_time).await?;

    tracing::debug!(user_id, %session_token, "Request authenticated");
    Ok(AuthUser {
        user_id,
        name: profile.fullname,
        email: profile.email,
        phone: profile.mobilenumber,
        session_token,
    })
}
