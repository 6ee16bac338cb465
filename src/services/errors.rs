use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::domain::types::{PlaceId, UserId};

/// Document a service call referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Place(PlaceId),
    User(UserId),
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Place(id) => write!(f, "place {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("{0} not found")]
    NotFound(Entity),
    /// Search parameters could not be parsed.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    #[error("user {user_id} has already scrapped place {place_id}")]
    AlreadyLinked { user_id: UserId, place_id: PlaceId },
    #[error("user {user_id} has not scrapped place {place_id}")]
    NotLinked { user_id: UserId, place_id: PlaceId },
    /// Concurrent writers kept winning; nothing was written.
    #[error("place {place_id} kept changing, gave up after {attempts} attempt(s)")]
    ConcurrencyConflict { place_id: PlaceId, attempts: usize },
    #[error("invalid form: {0}")]
    Form(String),
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
