//! Login session model and DTOs.

use apna_core::session::DeviceMetadata;
use apna_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use uuid::Uuid;

/// A session row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token: Uuid,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub platform: String,
    pub model_name: Option<String>,
    pub os_version: Option<String>,
    pub device_id: Option<String>,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: DbId,
    pub token: Uuid,
    pub end_time: Timestamp,
    pub device: DeviceMetadata,
}
