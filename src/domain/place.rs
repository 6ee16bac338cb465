use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Coordinates, ImageUrl, OfficeHourValue, PlaceAddress, PlaceContact, PlaceDescription, PlaceId,
    PlaceLabel, PlaceName, PlaceRating, Revision, UserId,
};
use crate::normalize::place_query;

/// Opening hours of a place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfficeHour {
    pub default: OfficeHourValue,
    pub weekend: Option<OfficeHourValue>,
    pub dayoff: Option<OfficeHourValue>,
}

/// One user's bookmark recorded on the place side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scrap {
    pub user: UserId,
    pub created_at: NaiveDateTime,
}

/// A searchable location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    pub name: PlaceName,
    pub address: PlaceAddress,
    pub label: PlaceLabel,
    pub contact: PlaceContact,
    pub description: Option<PlaceDescription>,
    pub thumbnail: Option<ImageUrl>,
    pub office_hour: Option<OfficeHour>,
    pub images: Vec<ImageUrl>,
    pub location: Coordinates,
    pub rating: PlaceRating,
    /// Normalized search text derived from name, label, address and description.
    pub query: String,
    /// At most one entry per user, in scrap order.
    pub scraps: Vec<Scrap>,
    pub revision: Revision,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Place {
    /// Recomputes the normalized `query` field from the current text fields.
    pub fn refresh_query(&mut self) {
        self.query = place_query(
            &self.name,
            self.label,
            &self.address,
            self.description.as_deref(),
        );
    }

    /// Whether `user_id` has an entry in [`Place::scraps`].
    pub fn is_scrapped_by(&self, user_id: UserId) -> bool {
        self.scraps.iter().any(|scrap| scrap.user == user_id)
    }

    /// Merges the supplied fields and recomputes `query` unconditionally.
    pub fn apply_update(&mut self, update: PlaceUpdate) {
        let PlaceUpdate {
            name,
            address,
            label,
            contact,
            description,
            thumbnail,
            office_hour,
            images,
            location,
            rating,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(label) = label {
            self.label = label;
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        if description.is_some() {
            self.description = description;
        }
        if thumbnail.is_some() {
            self.thumbnail = thumbnail;
        }
        if office_hour.is_some() {
            self.office_hour = office_hour;
        }
        if let Some(images) = images {
            self.images = images;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }

        self.refresh_query();
    }
}

/// Information required to create a new [`Place`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlace {
    pub name: PlaceName,
    pub address: PlaceAddress,
    pub label: PlaceLabel,
    pub contact: PlaceContact,
    pub description: Option<PlaceDescription>,
    pub thumbnail: Option<ImageUrl>,
    pub office_hour: Option<OfficeHour>,
    pub images: Vec<ImageUrl>,
    pub location: Coordinates,
    pub rating: PlaceRating,
    pub query: String,
    pub created_at: NaiveDateTime,
}

impl NewPlace {
    /// Derives the normalized `query` field for the insert.
    pub fn with_computed_query(mut self) -> Self {
        self.query = place_query(
            &self.name,
            self.label,
            &self.address,
            self.description.as_deref(),
        );
        self
    }
}

/// Partial set of fields merged onto an existing [`Place`]. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceUpdate {
    pub name: Option<PlaceName>,
    pub address: Option<PlaceAddress>,
    pub label: Option<PlaceLabel>,
    pub contact: Option<PlaceContact>,
    pub description: Option<PlaceDescription>,
    pub thumbnail: Option<ImageUrl>,
    pub office_hour: Option<OfficeHour>,
    pub images: Option<Vec<ImageUrl>>,
    pub location: Option<Coordinates>,
    pub rating: Option<PlaceRating>,
}
