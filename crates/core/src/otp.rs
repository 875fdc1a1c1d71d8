//! One-time password generation and verification.
//!
//! Codes are drawn from the OS entropy source, base64-encoded and filtered
//! down to ASCII alphanumerics. Base64 output contains `-` and `_`, so a
//! single batch of random bytes can filter to fewer characters than
//! requested; [`generate_otp`] keeps drawing until the code is full.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default number of characters in an issued OTP.
pub const DEFAULT_OTP_LENGTH: usize = 6;

/// Default OTP lifetime in minutes.
pub const DEFAULT_OTP_TTL_MINS: i64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("OTP length must be a positive integer")]
    InvalidLength,

    #[error("Random source unavailable: {0}")]
    RandomSource(String),
}

impl From<OtpError> for CoreError {
    fn from(err: OtpError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

/// Generate an alphanumeric OTP of exactly `length` characters.
pub fn generate_otp(length: usize) -> Result<String, OtpError> {
    if length == 0 {
        return Err(OtpError::InvalidLength);
    }

    let mut code = String::with_capacity(length);
    let mut buf = vec![0u8; length];

    while code.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| OtpError::RandomSource(e.to_string()))?;

        let encoded = URL_SAFE.encode(&buf);
        code.extend(encoded.chars().filter(char::is_ascii_alphanumeric));
    }

    code.truncate(length);
    Ok(code)
}

/// Outcome of comparing a supplied OTP against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    /// No OTP has been issued, or the last one was already used.
    Missing,
    Expired,
    Mismatch,
}

/// Compare a supplied code with the stored code and its expiry.
///
/// A stored code without an expiry never expires.
pub fn check_otp(
    stored: Option<&str>,
    expires_at: Option<Timestamp>,
    supplied: &str,
    now: Timestamp,
) -> OtpCheck {
    let Some(stored) = stored.filter(|s| !s.is_empty()) else {
        return OtpCheck::Missing;
    };
    if stored != supplied {
        return OtpCheck::Mismatch;
    }
    match expires_at {
        Some(at) if at <= now => OtpCheck::Expired,
        _ => OtpCheck::Valid,
    }
}
