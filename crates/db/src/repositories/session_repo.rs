//! Repository for the `sessions` table.

use apna_core::types::{DbId, Timestamp};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, start_time, end_time, \
                        platform, model_name, os_version, device_id";

/// Provides persistence operations for login sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, token, end_time, platform, model_name, os_version, device_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(input.token)
            .bind(input.end_time)
            .bind(&input.device.platform)
            .bind(&input.device.model_name)
            .bind(&input.device.os_version)
            .bind(&input.device.device_id)
            .fetch_one(pool)
            .await
    }

    /// All sessions ever started by a user, newest first. Includes expired ones.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Session>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY start_time DESC");
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Move a session's end time. Returns `true` if the row was updated.
    pub async fn touch(
        pool: &PgPool,
        token: Uuid,
        end_time: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET end_time = $2 WHERE token = $1")
            .bind(token)
            .bind(end_time)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
