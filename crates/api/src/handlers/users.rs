//! Handlers for user registration and the caller's own identity.

use apna_core::email::parse_email;
use apna_core::error::CoreError;
use apna_core::phone::normalize_phone;
use apna_core::types::DbId;
use apna_db::models::user::CreateUser;
use apna_db::repositories::UserRepo;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, EMAIL_TAKEN, PHONE_TAKEN};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /api/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobilenumber: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: DbId,
}

fn validation(message: &str) -> AppError {
    AppError::Core(CoreError::Validation(message.to_string()))
}

fn conflict(message: &str) -> AppError {
    AppError::Core(CoreError::Conflict(message.to_string()))
}

/// POST /api/register
///
/// Create a user and its empty profile on behalf of the authenticated actor.
pub async fn register(
    actor: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(input) = payload?;

    if input.email.trim().is_empty() {
        tracing::info!(actor = actor.user_id, "Register rejected: empty email");
        return Err(validation("Please enter email for registration"));
    }

    let fullname = input.name.trim();
    if fullname.is_empty() {
        tracing::info!(actor = actor.user_id, "Register rejected: empty name");
        return Err(validation("Please enter name for registration"));
    }

    let email = parse_email(&input.email).map_err(|e| {
        tracing::info!(actor = actor.user_id, email = %input.email, "Register rejected: malformed email");
        AppError::Core(e)
    })?;

    if UserRepo::email_exists(&state.pool, &email).await? {
        tracing::info!(actor = actor.user_id, %email, "Register rejected: email already registered");
        return Err(conflict(EMAIL_TAKEN));
    }

    if input.mobilenumber.trim().is_empty() {
        tracing::info!(actor = actor.user_id, "Register rejected: empty phone number");
        return Err(validation("Please enter phone number for registration"));
    }

    let mobilenumber =
        normalize_phone(&input.mobilenumber, state.config.phone_region).map_err(|e| {
            tracing::info!(
                actor = actor.user_id,
                phone = %input.mobilenumber,
                error = %e,
                "Register rejected: phone number did not parse"
            );
            AppError::Core(CoreError::from(e))
        })?;

    if UserRepo::phone_exists(&state.pool, &mobilenumber).await? {
        tracing::info!(actor = actor.user_id, %mobilenumber, "Register rejected: phone already registered");
        return Err(conflict(PHONE_TAKEN));
    }

    let user = UserRepo::create_with_profile(
        &state.pool,
        &CreateUser {
            fullname: fullname.to_string(),
            email,
            mobilenumber,
            created_by: Some(actor.user_id),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, actor = actor.user_id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "success",
            user_id: user.id,
        }),
    ))
}

/// GET /api/me
///
/// Return the identity the auth extractor resolved for this request.
pub async fn me(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}
