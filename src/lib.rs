//! Core library exports for the places service.
//!
//! With only the `data` feature the crate exposes the domain, text
//! normalization, geo math and the Diesel persistence layer. The default
//! `server` feature adds forms, services and the Actix-web routes.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod geo;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod normalize;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
