//! Diesel row types and their conversions to domain entities.

#[cfg(feature = "server")]
pub mod config;
pub mod place;
pub mod user;
