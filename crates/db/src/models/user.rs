//! User entity model and DTOs.

use apna_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Carries the current OTP -- NEVER serialize this to API responses directly.
/// Use [`UserProfile`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub fullname: String,
    pub email: String,
    pub mobilenumber: String,
    pub otp: Option<String>,
    pub otp_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub created_by: Option<DbId>,
    pub archived_at: Option<Timestamp>,
    pub deactivated: bool,
    pub updated_at: Timestamp,
}

/// Public projection of a user, returned by login and embedded in tokens.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub id: DbId,
    #[serde(rename = "name")]
    pub fullname: String,
    pub email: String,
    #[serde(rename = "phone")]
    pub mobilenumber: String,
}

/// DTO for creating a new user. Fields must already be normalised.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub fullname: String,
    pub email: String,
    pub mobilenumber: String,
    /// The authenticated user performing the registration, if any.
    pub created_by: Option<DbId>,
}
