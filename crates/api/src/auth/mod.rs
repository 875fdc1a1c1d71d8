//! Authentication primitives.
//!
//! - [`jwt`] -- login token issuance and validation.

pub mod jwt;
