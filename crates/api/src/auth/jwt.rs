//! Signed login tokens.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. The token only
//! proves the server handed out a given session id; whether that session is
//! still usable is decided by the `sessions` table, see
//! [`crate::middleware::auth`].

use apna_core::session::DeviceMetadata;
use apna_core::types::DbId;
use apna_db::models::user::UserProfile;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::env_minutes;

/// Default token lifetime in minutes.
const DEFAULT_TOKEN_EXPIRY_MINS: i64 = 60;

/// JWT claims embedded in every login token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer -- the user's database id, stringified.
    pub iss: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    pub data: SessionClaims,
}

/// The `data` block of [`Claims`]: who logged in, from which device, and
/// which server-side session the token belongs to.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub device: DeviceMetadata,
    pub uuid_token: Uuid,
}

impl Claims {
    /// The user id and session token this token refers to.
    ///
    /// Fails if the issuer is not a numeric user id.
    pub fn session_ref(&self) -> Result<(DbId, Uuid), std::num::ParseIntError> {
        let user_id = self.iss.parse::<DbId>()?;
        Ok((user_id, self.data.uuid_token))
    }
}

/// Configuration for token signing and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in minutes (default: 60).
    pub token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_EXPIRY_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty, or if `JWT_EXPIRY_MINS`
    /// is outside `1..=MAX_LIFETIME_MINS`.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            token_expiry_mins: env_minutes("JWT_EXPIRY_MINS", DEFAULT_TOKEN_EXPIRY_MINS),
        }
    }
}

/// Sign a token for a freshly created session.
pub fn issue_token(
    user: &UserProfile,
    session_token: Uuid,
    device: &DeviceMetadata,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let user_id = user.id.to_string();

    let claims = Claims {
        iss: user_id.clone(),
        iat: now,
        exp: now + config.token_expiry_mins * 60,
        data: SessionClaims {
            id: user_id,
            name: user.fullname.clone(),
            email: user.email.clone(),
            device: device.clone(),
            uuid_token: session_token,
        },
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify the signature and `exp` of a token and decode its [`Claims`].
///
/// Missing or mistyped claim fields fail here rather than later.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
