use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{PlaceId, Revision, UserId, UserName};

/// The part of a user account the places service cares about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    /// Scrapped places in scrap order. Each id appears at most once.
    pub places: Vec<PlaceId>,
    pub revision: Revision,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn has_scrapped(&self, place_id: PlaceId) -> bool {
        self.places.contains(&place_id)
    }
}

/// Data required to insert a new [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: UserName,
    pub created_at: NaiveDateTime,
}
