//! Phone number normalisation to E.164.
//!
//! Numbers are parsed relative to a default region (ISO 3166 alpha-2), so a
//! national number such as `9876543210` in `IN` and the international form
//! `+91 98765 43210` both normalise to `+919876543210`.

use phonenumber::country;
use phonenumber::Mode;

use crate::error::CoreError;

/// A phone numbering region, e.g. `IN`.
pub type Region = country::Id;

/// Region applied to numbers submitted without a country code.
pub const DEFAULT_REGION: &str = "IN";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number cannot be empty")]
    Empty,

    #[error("Unknown phone region: {0}")]
    UnknownRegion(String),

    #[error("Phone number not in a correct format")]
    Unparseable,

    #[error("Invalid phone number")]
    Invalid,
}

impl From<PhoneError> for CoreError {
    fn from(err: PhoneError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// Parse a region code such as `"IN"` or `"us"`.
pub fn parse_region(region: &str) -> Result<Region, PhoneError> {
    region
        .trim()
        .to_ascii_uppercase()
        .parse::<country::Id>()
        .map_err(|_| PhoneError::UnknownRegion(region.to_string()))
}

/// Strip the noise clients commonly send before parsing.
///
/// Some clients prepend a dialling prefix to an already-international number
/// (`+91 +919876543210`); only the part after the last `+` is kept in that
/// case. Whitespace is removed.
fn clean(raw: &str) -> String {
    let trimmed = raw.trim();
    let tail = if trimmed.matches('+').count() == 2 {
        trimmed
            .rfind('+')
            .map(|idx| &trimmed[idx..])
            .unwrap_or(trimmed)
    } else {
        trimmed
    };
    tail.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Validate `raw` and return it in E.164 form.
pub fn normalize_phone(raw: &str, region: Region) -> Result<String, PhoneError> {
    if raw.trim().is_empty() {
        return Err(PhoneError::Empty);
    }

    let cleaned = clean(raw);
    let number =
        phonenumber::parse(Some(region), &cleaned).map_err(|_| PhoneError::Unparseable)?;

    if !phonenumber::is_valid(&number) {
        return Err(PhoneError::Invalid);
    }

    Ok(number.format().mode(Mode::E164).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn india() -> Region {
        parse_region(DEFAULT_REGION).unwrap()
    }

    #[test]
    fn national_number_gets_country_code() {
        assert_eq!(normalize_phone("9876543210", india()).unwrap(), "+919876543210");
    }

    #[test]
    fn spaced_international_form_normalises_identically() {
        assert_eq!(
            normalize_phone("+91 98765 43210", india()).unwrap(),
            "+919876543210"
        );
    }

    #[test]
    fn duplicated_prefix_keeps_last_segment() {
        assert_eq!(clean("+91 +919876543210"), "+919876543210");
        assert_eq!(
            normalize_phone("+91 +919876543210", india()).unwrap(),
            "+919876543210"
        );
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(normalize_phone("   ", india()), Err(PhoneError::Empty));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(normalize_phone("not a number", india()).is_err());
        assert!(normalize_phone("12", india()).is_err());
    }

    #[test]
    fn region_is_case_insensitive() {
        assert_eq!(parse_region("in").unwrap(), india());
        assert!(matches!(parse_region("ZZZ"), Err(PhoneError::UnknownRegion(_))));
    }
}
