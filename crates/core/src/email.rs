//! Email address normalisation.
//!
//! Emails are stored trimmed and lowercased; every lookup goes through
//! [`normalize_email`] so comparisons are case-insensitive.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Trim and lowercase an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalise `raw` and reject values that are not well-formed addresses.
pub fn parse_email(raw: &str) -> Result<String, CoreError> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(CoreError::Validation("Email cannot be empty".into()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation("Email address is not valid".into()));
    }
    Ok(email)
}
