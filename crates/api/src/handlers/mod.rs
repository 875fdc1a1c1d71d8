//! Request handlers.
//!
//! Handlers validate input, delegate persistence to the repositories in
//! `apna_db` and map failures via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod users;
