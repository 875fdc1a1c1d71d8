//! Request extractors enforcing authentication.
//!
//! - [`auth::AuthUser`] -- Admits a request carrying a bearer token bound to a
//!   live session.

pub mod auth;
