use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::place::{
    NewPlace as DomainNewPlace, OfficeHour, Place as DomainPlace, Scrap as DomainScrap,
};
use crate::domain::types::{
    Coordinates, ImageUrl, OfficeHourValue, PlaceAddress, PlaceContact, PlaceDescription,
    PlaceLabel, PlaceName, PlaceRating, Revision, TypeConstraintError,
};

/// Diesel model representing the `places` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::places)]
pub struct Place {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub label: String,
    pub contact: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub office_hour_default: Option<String>,
    pub office_hour_weekend: Option<String>,
    pub office_hour_dayoff: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub rating: f64,
    pub search_query: String,
    pub revision: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`Place`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::places)]
pub struct NewPlace {
    pub name: String,
    pub address: String,
    pub label: String,
    pub contact: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub office_hour_default: Option<String>,
    pub office_hour_weekend: Option<String>,
    pub office_hour_dayoff: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub rating: f64,
    pub search_query: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full rewrite of the scalar columns of an existing [`Place`].
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::places)]
#[diesel(treat_none_as_null = true)]
pub struct PlaceChanges {
    pub name: String,
    pub address: String,
    pub label: String,
    pub contact: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub office_hour_default: Option<String>,
    pub office_hour_weekend: Option<String>,
    pub office_hour_dayoff: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub rating: f64,
    pub search_query: String,
}

/// Diesel model representing the `place_images` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::place_images)]
pub struct PlaceImage {
    pub id: i32,
    pub place_id: i32,
    pub url: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::place_images)]
pub struct NewPlaceImage {
    pub place_id: i32,
    pub url: String,
}

/// Diesel model representing the `place_scraps` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::place_scraps)]
pub struct PlaceScrap {
    pub id: i32,
    pub place_id: i32,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::place_scraps)]
pub struct NewPlaceScrap {
    pub place_id: i32,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

fn office_hour_from_columns(
    default: Option<String>,
    weekend: Option<String>,
    dayoff: Option<String>,
) -> Result<Option<OfficeHour>, TypeConstraintError> {
    let Some(default) = default else {
        return Ok(None);
    };
    Ok(Some(OfficeHour {
        default: OfficeHourValue::new(default)?,
        weekend: weekend.map(OfficeHourValue::new).transpose()?,
        dayoff: dayoff.map(OfficeHourValue::new).transpose()?,
    }))
}

impl Place {
    /// Converts the row plus its child rows into a domain [`DomainPlace`].
    pub fn into_domain(
        self,
        images: Vec<PlaceImage>,
        scraps: Vec<PlaceScrap>,
    ) -> Result<DomainPlace, TypeConstraintError> {
        Ok(DomainPlace {
            id: self.id.try_into()?,
            name: PlaceName::new(self.name)?,
            address: PlaceAddress::new(self.address)?,
            label: PlaceLabel::try_from(self.label)?,
            contact: PlaceContact::new(self.contact)?,
            description: self.description.map(PlaceDescription::new).transpose()?,
            thumbnail: self.thumbnail.map(ImageUrl::new).transpose()?,
            office_hour: office_hour_from_columns(
                self.office_hour_default,
                self.office_hour_weekend,
                self.office_hour_dayoff,
            )?,
            images: images
                .into_iter()
                .map(|image| ImageUrl::new(image.url))
                .collect::<Result<_, _>>()?,
            location: Coordinates::new(self.longitude, self.latitude)?,
            rating: PlaceRating::new(self.rating)?,
            query: self.search_query,
            scraps: scraps
                .into_iter()
                .map(|scrap| {
                    Ok(DomainScrap {
                        user: scrap.user_id.try_into()?,
                        created_at: scrap.created_at,
                    })
                })
                .collect::<Result<_, TypeConstraintError>>()?,
            revision: Revision::new(self.revision)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn split_office_hour(
    office_hour: Option<OfficeHour>,
) -> (Option<String>, Option<String>, Option<String>) {
    match office_hour {
        Some(hours) => (
            Some(hours.default.into_inner()),
            hours.weekend.map(OfficeHourValue::into_inner),
            hours.dayoff.map(OfficeHourValue::into_inner),
        ),
        None => (None, None, None),
    }
}

impl From<DomainNewPlace> for NewPlace {
    fn from(place: DomainNewPlace) -> Self {
        let (office_hour_default, office_hour_weekend, office_hour_dayoff) =
            split_office_hour(place.office_hour);
        Self {
            name: place.name.into_inner(),
            address: place.address.into_inner(),
            label: place.label.as_str().to_string(),
            contact: place.contact.into_inner(),
            description: place.description.map(PlaceDescription::into_inner),
            thumbnail: place.thumbnail.map(ImageUrl::into_inner),
            office_hour_default,
            office_hour_weekend,
            office_hour_dayoff,
            longitude: place.location.longitude(),
            latitude: place.location.latitude(),
            rating: place.rating.get(),
            search_query: place.query,
            created_at: place.created_at,
            updated_at: place.created_at,
        }
    }
}

impl From<&DomainPlace> for PlaceChanges {
    fn from(place: &DomainPlace) -> Self {
        let (office_hour_default, office_hour_weekend, office_hour_dayoff) =
            split_office_hour(place.office_hour.clone());
        Self {
            name: place.name.as_str().to_string(),
            address: place.address.as_str().to_string(),
            label: place.label.as_str().to_string(),
            contact: place.contact.as_str().to_string(),
            description: place.description.as_ref().map(|d| d.as_str().to_string()),
            thumbnail: place.thumbnail.as_ref().map(|t| t.as_str().to_string()),
            office_hour_default,
            office_hour_weekend,
            office_hour_dayoff,
            longitude: place.location.longitude(),
            latitude: place.location.latitude(),
            rating: place.rating.get(),
            search_query: place.query.clone(),
        }
    }
}
