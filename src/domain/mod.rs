//! Domain entities and the rules that keep them consistent.

pub mod place;
pub mod scrap;
pub mod types;
pub mod user;
