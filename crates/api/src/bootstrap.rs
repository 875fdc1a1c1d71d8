//! First-user seeding.
//!
//! Registration requires an authenticated caller, so a fresh database needs
//! one account created out of band. When `BOOTSTRAP_EMAIL`, `BOOTSTRAP_NAME`
//! and `BOOTSTRAP_PHONE` are all set, [`ensure_bootstrap_user`] creates that
//! account at startup unless it already exists.

use apna_core::email::parse_email;
use apna_core::error::CoreError;
use apna_core::phone::{normalize_phone, Region};
use apna_core::types::DbId;
use apna_db::models::user::CreateUser;
use apna_db::repositories::UserRepo;
use apna_db::DbPool;

use crate::error::AppError;

/// Account to create when the database has no matching user.
#[derive(Debug, Clone)]
pub struct BootstrapUser {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl BootstrapUser {
    /// Returns `None` unless all three `BOOTSTRAP_*` variables are set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            name: std::env::var("BOOTSTRAP_NAME").ok()?,
            email: std::env::var("BOOTSTRAP_EMAIL").ok()?,
            phone: std::env::var("BOOTSTRAP_PHONE").ok()?,
        })
    }
}

/// Create the bootstrap account if no active user has its email.
///
/// Returns the new user's id, or `None` if the account already existed.
pub async fn ensure_bootstrap_user(
    pool: &DbPool,
    seed: &BootstrapUser,
    region: Region,
) -> Result<Option<DbId>, AppError> {
    let email = parse_email(&seed.email)?;
    if UserRepo::email_exists(pool, &email).await? {
        tracing::debug!(%email, "Bootstrap user already present");
        return Ok(None);
    }

    let fullname = seed.name.trim();
    if fullname.is_empty() {
        return Err(CoreError::Validation("BOOTSTRAP_NAME cannot be empty".into()).into());
    }
    let mobilenumber = normalize_phone(&seed.phone, region).map_err(CoreError::from)?;

    let user = UserRepo::create_with_profile(
        pool,
        &CreateUser {
            fullname: fullname.to_string(),
            email,
            mobilenumber,
            created_by: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Bootstrap user created");
    Ok(Some(user.id))
}
