use std::sync::Arc;

use crate::config::ServerConfig;
use crate::mail::OtpMailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: apna_db::DbPool,
    /// Server configuration, including the token signing secret.
    pub config: Arc<ServerConfig>,
    /// SMTP delivery for OTP codes; `None` when SMTP is not configured.
    pub mailer: Option<Arc<OtpMailer>>,
}
