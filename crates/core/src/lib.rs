//! Domain logic shared by the database and API crates.
//!
//! Everything here is pure: no database handles, no HTTP types.

pub mod email;
pub mod error;
pub mod otp;
pub mod phone;
pub mod session;
pub mod types;
