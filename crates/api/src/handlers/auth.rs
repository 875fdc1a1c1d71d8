//! Handlers for OTP issuance and login.

use std::sync::Arc;

use apna_core::email::normalize_email;
use apna_core::error::CoreError;
use apna_core::otp::{check_otp, generate_otp, OtpCheck};
use apna_core::session::{extended_end_time, DeviceMetadata};
use apna_db::models::session::CreateSession;
use apna_db::models::user::UserProfile;
use apna_db::repositories::{SessionRepo, UserRepo};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::issue_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response to every OTP request, whether or not the email is registered.
pub const OTP_SENT_MESSAGE: &str = "If the email is registered, an OTP has been sent";

/// Shown for every wrong, reused or missing code.
const OTP_INCORRECT: &str = "OTP Not Correct";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/otp`.
#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    #[serde(default)]
    pub email: String,
}

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(flatten)]
    pub device: DeviceMetadata,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_info: UserProfile,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/otp
///
/// Generate and store a fresh OTP for the account behind `email` and email it
/// in the background. Always answers 202, whether or not the email is
/// registered and whether or not delivery succeeds.
pub async fn request_otp(
    State(state): State<AppState>,
    payload: Result<Json<OtpRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let Json(input) = payload?;

    let email = normalize_email(&input.email);
    if email.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Please enter email to receive an OTP".into(),
        )));
    }

    let ttl_mins = state.config.otp.ttl_mins;
    let code = generate_otp(state.config.otp.length).map_err(CoreError::from)?;
    let expires_at = Utc::now() + chrono::Duration::minutes(ttl_mins);

    let stored = UserRepo::store_otp(&state.pool, &email, &code, expires_at).await?;
    if !stored {
        tracing::info!(%email, "OTP requested for unregistered email");
    } else if let Some(mailer) = &state.mailer {
        // Off the request path, so SMTP latency and errors look the same for
        // registered and unknown emails.
        let mailer = Arc::clone(mailer);
        tokio::spawn(async move {
            if let Err(e) = mailer.send_otp(&email, &code, ttl_mins).await {
                tracing::error!(error = %e, %email, "OTP delivery failed");
            }
        });
    } else {
        tracing::warn!(%email, "SMTP is not configured; OTP stored but not delivered");
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: OTP_SENT_MESSAGE,
        }),
    ))
}

/// POST /api/login
///
/// Exchange an email + OTP for a signed token bound to a new session.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(input) = payload?;

    // 1. Required fields.
    if input.otp.is_empty() {
        tracing::info!("Login rejected: empty otp");
        return Err(AppError::BadRequest("Empty otp!".into()));
    }
    let email = normalize_email(&input.email);
    if email.is_empty() {
        tracing::info!("Login rejected: empty email");
        return Err(AppError::BadRequest("Please enter email to login".into()));
    }

    // 2. Find the account.
    let user = UserRepo::find_active_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            tracing::info!(%email, "Login rejected: no live account for email");
            AppError::BadRequest("error getting user info".into())
        })?;

    // 3. Verify the code.
    match check_otp(
        user.otp.as_deref(),
        user.otp_expires_at,
        &input.otp,
        Utc::now(),
    ) {
        OtpCheck::Valid => {}
        OtpCheck::Expired => {
            tracing::info!(user_id = user.id, "Login rejected: OTP expired");
            return Err(AppError::BadRequest(
                "OTP has expired, please request a new one".into(),
            ));
        }
        check @ (OtpCheck::Mismatch | OtpCheck::Missing) => {
            tracing::info!(user_id = user.id, ?check, "Login rejected: OTP not matched");
            return Err(AppError::BadRequest(OTP_INCORRECT.into()));
        }
    }

    // 4. Consume it; a concurrent login may have won the race.
    if !UserRepo::consume_otp(&state.pool, user.id, &input.otp).await? {
        tracing::info!(user_id = user.id, "Login rejected: OTP consumed concurrently");
        return Err(AppError::BadRequest(OTP_INCORRECT.into()));
    }

    // 5. Start a session.
    let session = SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            token: Uuid::new_v4(),
            end_time: extended_end_time(Utc::now(), state.config.session_window_mins),
            device: input.device.clone(),
        },
    )
    .await?;

    // 6. Fresh profile + signed token.
    let user_info = UserRepo::find_profile(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("User {} vanished during login", user.id)))?;

    let token = issue_token(&user_info, session.token, &input.device, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, session_id = session.id, "User logged in");
    Ok(Json(LoginResponse { user_info, token }))
}
