use serde::Serialize;

use crate::domain::place::Place;

/// Search result: the place plus its distance from the query origin, when
/// the query had one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaceSearchHit {
    #[serde(flatten)]
    pub place: Place,
    /// Kilometers from the query origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}
