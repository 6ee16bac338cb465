//! Response shapes that differ from the domain entities.

pub mod places;
