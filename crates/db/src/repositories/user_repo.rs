//! Repository for the `users` and `user_profiles` tables.
//!
//! Lookups only consider live accounts: `archived_at IS NULL` and
//! `deactivated IS FALSE`. Emails are compared in lowercase.

use apna_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, UserProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, fullname, email, mobilenumber, otp, otp_expires_at, \
                        created_at, created_by, archived_at, deactivated, updated_at";

/// Predicate selecting live accounts.
const ACTIVE: &str = "archived_at IS NULL AND deactivated IS FALSE";

/// Provides persistence operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user and its empty profile row in one transaction.
    ///
    /// If the profile insert fails the user row is rolled back with it.
    pub async fn create_with_profile(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (fullname, email, mobilenumber, created_by)
             VALUES (trim($1), lower(trim($2)), $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.fullname)
            .bind(&input.email)
            .bind(&input.mobilenumber)
            .bind(input.created_by)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_profiles (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(user_id = user.id, "User and profile created");
        Ok(user)
    }

    /// Find a live user by internal ID.
    pub async fn find_active_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND {ACTIVE}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live user by email (case-insensitive).
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower(trim($1)) AND {ACTIVE}");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Whether a live user already owns this email (case-insensitive).
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower(trim($1)) AND {ACTIVE})"
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Whether a live user already owns this E.164 phone number.
    pub async fn phone_exists(pool: &PgPool, mobilenumber: &str) -> Result<bool, sqlx::Error> {
        let query =
            format!("SELECT EXISTS(SELECT 1 FROM users WHERE mobilenumber = $1 AND {ACTIVE})");
        sqlx::query_scalar::<_, bool>(&query)
            .bind(mobilenumber)
            .fetch_one(pool)
            .await
    }

    /// Load the public projection of a user.
    pub async fn find_profile(pool: &PgPool, id: DbId) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "SELECT id, fullname, email, mobilenumber FROM users WHERE id = $1 AND {ACTIVE}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the current OTP of the live user owning `email`.
    ///
    /// Returns `true` if a user was updated.
    pub async fn store_otp(
        pool: &PgPool,
        email: &str,
        otp: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE users SET otp = $2, otp_expires_at = $3
             WHERE lower(email) = lower(trim($1)) AND {ACTIVE}"
        );
        let result = sqlx::query(&query)
            .bind(email)
            .bind(otp)
            .bind(expires_at)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the OTP if it still equals `otp`.
    ///
    /// Returns `false` when another request consumed or replaced it first.
    pub async fn consume_otp(pool: &PgPool, id: DbId, otp: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET otp = NULL, otp_expires_at = NULL WHERE id = $1 AND otp = $2",
        )
        .bind(id)
        .bind(otp)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
