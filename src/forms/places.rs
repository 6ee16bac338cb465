use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::place::{NewPlace, OfficeHour, PlaceUpdate};
use crate::domain::types::{
    Coordinates, ImageUrl, OfficeHourValue, PlaceAddress, PlaceContact, PlaceDescription,
    PlaceId, PlaceLabel, PlaceName, PlaceRating, RangeKm, TypeConstraintError,
};
use crate::repository::PlaceSearchQuery;

/// Location as sent by clients: either `[lon, lat]` or a GeoJSON point.
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(untagged)]
pub enum LocationInput {
    Pair([f64; 2]),
    Point { coordinates: [f64; 2] },
}

impl TryFrom<LocationInput> for Coordinates {
    type Error = TypeConstraintError;

    fn try_from(value: LocationInput) -> Result<Self, Self::Error> {
        match value {
            LocationInput::Pair(pair) | LocationInput::Point { coordinates: pair } => {
                Coordinates::try_from(pair)
            }
        }
    }
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct OfficeHourForm {
    #[validate(length(min = 1))]
    pub default: String,
    pub weekend: Option<String>,
    pub dayoff: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<OfficeHourForm> for OfficeHour {
    type Error = TypeConstraintError;

    fn try_from(value: OfficeHourForm) -> Result<Self, Self::Error> {
        Ok(Self {
            default: OfficeHourValue::new(value.default)?,
            weekend: non_blank(value.weekend)
                .map(OfficeHourValue::new)
                .transpose()?,
            dayoff: non_blank(value.dayoff).map(OfficeHourValue::new).transpose()?,
        })
    }
}

fn parse_images(images: Vec<String>) -> Result<Vec<ImageUrl>, TypeConstraintError> {
    images.into_iter().map(ImageUrl::new).collect()
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaceForm {
    #[validate(length(min = 1))]
    pub name: String,
    pub location: LocationInput,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub contact: String,
    pub label: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub thumbnail: Option<String>,
    #[validate(nested)]
    pub office_hour: Option<OfficeHourForm>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePlacePayload {
    pub name: PlaceName,
    pub location: Coordinates,
    pub address: PlaceAddress,
    pub contact: PlaceContact,
    pub label: PlaceLabel,
    pub description: Option<PlaceDescription>,
    pub thumbnail: Option<ImageUrl>,
    pub office_hour: Option<OfficeHour>,
    pub images: Vec<ImageUrl>,
}

impl CreatePlacePayload {
    /// Builds the insert, deriving the normalized search text.
    pub fn into_new_place(self) -> NewPlace {
        NewPlace {
            name: self.name,
            address: self.address,
            label: self.label,
            contact: self.contact,
            description: self.description,
            thumbnail: self.thumbnail,
            office_hour: self.office_hour,
            images: self.images,
            location: self.location,
            rating: PlaceRating::default(),
            query: String::new(),
            created_at: Utc::now().naive_utc(),
        }
        .with_computed_query()
    }
}

#[derive(Debug, Error)]
pub enum CreatePlaceFormError {
    #[error("Create place form validation failed: {0}")]
    Validation(String),
    #[error("Create place form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CreatePlaceFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CreatePlaceFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<CreatePlaceForm> for CreatePlacePayload {
    type Error = CreatePlaceFormError;

    fn try_from(value: CreatePlaceForm) -> Result<Self, Self::Error> {
        value.validate()?;

        let label = match non_blank(value.label) {
            Some(label) => PlaceLabel::try_from(label)?,
            None => PlaceLabel::default(),
        };

        Ok(Self {
            name: PlaceName::new(value.name)?,
            location: Coordinates::try_from(value.location)?,
            address: PlaceAddress::new(value.address)?,
            contact: PlaceContact::new(value.contact)?,
            label,
            description: non_blank(value.description)
                .map(PlaceDescription::new)
                .transpose()?,
            thumbnail: non_blank(value.thumbnail).map(ImageUrl::new).transpose()?,
            office_hour: value.office_hour.map(OfficeHour::try_from).transpose()?,
            images: parse_images(value.images)?,
        })
    }
}

/// Partial update; absent (or `null`) fields keep their stored values.
#[derive(Deserialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaceForm {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub location: Option<LocationInput>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1))]
    pub contact: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub thumbnail: Option<String>,
    #[validate(nested)]
    pub office_hour: Option<OfficeHourForm>,
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlaceFormPayload {
    pub update: PlaceUpdate,
}

#[derive(Debug, Error)]
pub enum UpdatePlaceFormError {
    #[error("Update place form validation failed: {0}")]
    Validation(String),
    #[error("Update place form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for UpdatePlaceFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdatePlaceFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdatePlaceForm> for UpdatePlaceFormPayload {
    type Error = UpdatePlaceFormError;

    fn try_from(value: UpdatePlaceForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            update: PlaceUpdate {
                name: value.name.map(PlaceName::new).transpose()?,
                address: value.address.map(PlaceAddress::new).transpose()?,
                label: non_blank(value.label)
                    .map(PlaceLabel::try_from)
                    .transpose()?,
                contact: value.contact.map(PlaceContact::new).transpose()?,
                description: non_blank(value.description)
                    .map(PlaceDescription::new)
                    .transpose()?,
                thumbnail: non_blank(value.thumbnail).map(ImageUrl::new).transpose()?,
                office_hour: value.office_hour.map(OfficeHour::try_from).transpose()?,
                images: value.images.map(parse_images).transpose()?,
                location: value.location.map(Coordinates::try_from).transpose()?,
                rating: value.rating.map(PlaceRating::new).transpose()?,
            },
        })
    }
}

/// Raw search parameters as they arrive in the query string.
///
/// `coordinates` is a JSON `[longitude, latitude]` pair, `range` is in
/// kilometers and `places` is a JSON array of ids.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SearchPlacesForm {
    pub keyword: Option<String>,
    pub label: Option<String>,
    pub coordinates: Option<String>,
    pub range: Option<String>,
    pub places: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SearchPlacesFormError {
    #[error("malformed {field}: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl SearchPlacesFormError {
    fn malformed(field: &'static str, reason: impl ToString) -> Self {
        Self::Malformed {
            field,
            reason: reason.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdInput {
    Number(i32),
    Text(String),
}

fn parse_place_ids(raw: &str) -> Result<Vec<PlaceId>, SearchPlacesFormError> {
    let items: Vec<IdInput> =
        serde_json::from_str(raw).map_err(|e| SearchPlacesFormError::malformed("places", e))?;

    items
        .into_iter()
        .map(|item| {
            let value = match item {
                IdInput::Number(value) => value,
                IdInput::Text(text) => text
                    .trim()
                    .parse::<i32>()
                    .map_err(|e| SearchPlacesFormError::malformed("places", e))?,
            };
            PlaceId::new(value).map_err(|e| SearchPlacesFormError::malformed("places", e))
        })
        .collect()
}

fn parse_coordinates(raw: &str) -> Result<Coordinates, SearchPlacesFormError> {
    let pair: [f64; 2] = serde_json::from_str(raw)
        .map_err(|e| SearchPlacesFormError::malformed("coordinates", e))?;
    Coordinates::try_from(pair).map_err(|e| SearchPlacesFormError::malformed("coordinates", e))
}

fn parse_range(raw: &str) -> Result<RangeKm, SearchPlacesFormError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| SearchPlacesFormError::malformed("range", e))?;
    RangeKm::new(value).map_err(|e| SearchPlacesFormError::malformed("range", e))
}

impl TryFrom<SearchPlacesForm> for PlaceSearchQuery {
    type Error = SearchPlacesFormError;

    fn try_from(value: SearchPlacesForm) -> Result<Self, Self::Error> {
        let mut query = PlaceSearchQuery::default();

        if let Some(keyword) = non_blank(value.keyword) {
            query = query.keyword(&keyword);
        }

        if let Some(label) = non_blank(value.label) {
            let label = PlaceLabel::try_from(label)
                .map_err(|e| SearchPlacesFormError::malformed("label", e))?;
            query = query.label(label);
        }

        let coordinates = non_blank(value.coordinates)
            .map(|raw| parse_coordinates(&raw))
            .transpose()?;
        let range = non_blank(value.range)
            .map(|raw| parse_range(&raw))
            .transpose()?;

        query = match (coordinates, range) {
            (Some(origin), Some(range)) => query.within(origin, range),
            (Some(origin), None) => query.near(origin),
            (None, Some(_)) => {
                return Err(SearchPlacesFormError::malformed(
                    "range",
                    "requires coordinates",
                ));
            }
            (None, None) => query,
        };

        if let Some(raw) = value.places {
            query = query.places(parse_place_ids(&raw)?);
        }

        Ok(query)
    }
}
