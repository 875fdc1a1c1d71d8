use std::str::FromStr;

use apna_core::otp::{DEFAULT_OTP_LENGTH, DEFAULT_OTP_TTL_MINS};
use apna_core::phone::{parse_region, Region, DEFAULT_REGION};
use apna_core::session::DEFAULT_SESSION_WINDOW_MINS;

use crate::auth::jwt::JwtConfig;
use crate::mail::MailConfig;

/// OTP issuance settings.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Characters per code (default: `6`).
    pub length: usize,
    /// Minutes a code stays usable (default: `10`).
    pub ttl_mins: i64,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may run after a shutdown signal (default: `5`).
    pub shutdown_timeout_secs: u64,
    /// Token signing configuration.
    pub jwt: JwtConfig,
    /// Sliding session window in minutes (default: `60`).
    pub session_window_mins: i64,
    pub otp: OtpConfig,
    /// Region used to interpret phone numbers without a country code.
    pub phone_region: Region,
    /// SMTP settings; `None` disables OTP email delivery.
    pub mail: Option<MailConfig>,
}

/// Read `key` from the environment, falling back to `default`.
///
/// # Panics
///
/// Panics if the variable is set but does not parse, so misconfiguration
/// fails at startup.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is not valid: {e}")),
        Err(_) => default,
    }
}

/// Longest accepted session, token or OTP lifetime: one year.
pub const MAX_LIFETIME_MINS: i64 = 60 * 24 * 365;

/// Read a lifetime in minutes, falling back to `default`.
///
/// # Panics
///
/// Panics unless the value lies in `1..=MAX_LIFETIME_MINS`. A zero or
/// negative lifetime would hand out sessions that are already expired.
pub(crate) fn env_minutes(key: &str, default: i64) -> i64 {
    let mins: i64 = env_or(key, default);
    assert!(
        (1..=MAX_LIFETIME_MINS).contains(&mins),
        "{key} must be between 1 and {MAX_LIFETIME_MINS} minutes, got {mins}"
    );
    mins
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                        |
    /// | `SESSION_WINDOW_MINS`   | `60`                       |
    /// | `OTP_LENGTH`            | `6`                        |
    /// | `OTP_TTL_MINS`          | `10`                       |
    /// | `PHONE_REGION`          | `IN`                       |
    ///
    /// See [`JwtConfig::from_env`] and [`MailConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let otp = OtpConfig {
            length: env_or("OTP_LENGTH", DEFAULT_OTP_LENGTH),
            ttl_mins: env_minutes("OTP_TTL_MINS", DEFAULT_OTP_TTL_MINS),
        };
        assert!(otp.length > 0, "OTP_LENGTH must be positive");

        let region = std::env::var("PHONE_REGION").unwrap_or_else(|_| DEFAULT_REGION.into());
        let phone_region =
            parse_region(&region).unwrap_or_else(|e| panic!("PHONE_REGION is not valid: {e}"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 5),
            jwt: JwtConfig::from_env(),
            session_window_mins: env_minutes("SESSION_WINDOW_MINS", DEFAULT_SESSION_WINDOW_MINS),
            otp,
            phone_region,
            mail: MailConfig::from_env(),
        }
    }
}
