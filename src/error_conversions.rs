//! Conversions from domain and form errors into [`ServiceError`].
//!
//! Kept apart from the domain so that `data`-only consumers do not pull in
//! the service layer.

use crate::domain::scrap::ScrapError;
use crate::domain::types::TypeConstraintError;
use crate::forms::places::{CreatePlaceFormError, SearchPlacesFormError, UpdatePlaceFormError};
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<ScrapError> for ServiceError {
    fn from(val: ScrapError) -> Self {
        match val {
            ScrapError::AlreadyLinked { user_id, place_id } => {
                ServiceError::AlreadyLinked { user_id, place_id }
            }
            ScrapError::NotLinked { user_id, place_id } => {
                ServiceError::NotLinked { user_id, place_id }
            }
        }
    }
}

impl From<CreatePlaceFormError> for ServiceError {
    fn from(val: CreatePlaceFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<UpdatePlaceFormError> for ServiceError {
    fn from(val: UpdatePlaceFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<SearchPlacesFormError> for ServiceError {
    fn from(val: SearchPlacesFormError) -> Self {
        ServiceError::MalformedQuery(val.to_string())
    }
}
