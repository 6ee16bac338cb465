pub mod errors;
pub mod places;
pub mod scraps;

pub use errors::{Entity, ServiceError, ServiceResult};
