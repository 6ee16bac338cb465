//! Strongly-typed value objects used by domain entities.
//!
//! Places and users carry these wrappers instead of raw primitives so that
//! identifiers, contact numbers, ratings and coordinates are checked once at
//! the boundary and trusted everywhere else.

use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateUrl;

/// Highest rating a place can carry.
pub const MAX_RATING: f64 = 5.0;

static CONTACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0\d{1,2}-)?\d{3,4}-\d{4}$").expect("contact pattern is a valid regex")
});

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be positive was zero/negative or invalid.
    #[error("{0} must be greater than zero")]
    NonPositiveNumber(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Contact did not look like a phone number.
    #[error("contact must look like 02-123-4567 or 123-4567")]
    InvalidContact,
    /// Rating outside of `[0, 5]`.
    #[error("rating must be between 0 and 5")]
    InvalidRating,
    /// Longitude outside of `[-180, 180]` or latitude outside of `[-90, 90]`.
    #[error("coordinates must be [longitude, latitude] within [-180, 180] and [-90, 90]")]
    InvalidCoordinates,
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

macro_rules! string_newtype_common {
    ($name:ident) => {
        impl $name {
            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }
        }

        string_newtype_common!($name);
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }
        }

        string_newtype_common!($name);
    };
}

id_newtype!(PlaceId, "Unique identifier for a place.", "place_id");
id_newtype!(UserId, "Unique identifier for a user.", "user_id");

non_empty_string_newtype!(PlaceName, "Place display name.", "name");
non_empty_string_newtype!(PlaceAddress, "Road address of a place.", "address");
non_empty_string_newtype!(
    PlaceDescription,
    "Free-form place description.",
    "description"
);
non_empty_string_newtype!(
    OfficeHourValue,
    "Human readable opening hours, e.g. `09:00-18:00`.",
    "office hour"
);
non_empty_string_newtype!(UserName, "User display name.", "user name");

url_string_newtype!(ImageUrl, "Place image or thumbnail URL.", "image url");

/// Phone number a place can be reached at, e.g. `02-123-4567`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceContact(String);

impl PlaceContact {
    /// Trims the value and checks it against the phone-number pattern.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = trim_and_require_non_empty(value, "contact")?;
        if CONTACT_PATTERN.is_match(&trimmed) {
            Ok(Self(trimmed))
        } else {
            Err(TypeConstraintError::InvalidContact)
        }
    }
}

string_newtype_common!(PlaceContact);

/// Monotonic optimistic-concurrency token stored next to each document.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Revision(i32);

impl Revision {
    /// Revision assigned to freshly inserted documents.
    pub const INITIAL: Self = Self(0);

    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("revision"))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Revision a successful write moves the document to.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Average review score in the inclusive range [0.0, 5.0].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct PlaceRating(f64);

impl PlaceRating {
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && (0.0..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidRating)
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PlaceRating {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaceRating> for f64 {
    fn from(value: PlaceRating) -> Self {
        value.0
    }
}

/// Search radius in kilometers. Always strictly positive.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct RangeKm(f64);

impl RangeKm {
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NonPositiveNumber("range"))
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for RangeKm {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RangeKm> for f64 {
    fn from(value: RangeKm) -> Self {
        value.0
    }
}

/// Geographic point. Serialized as `[longitude, latitude]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    longitude: f64,
    latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, TypeConstraintError> {
        let valid = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        if valid {
            Ok(Self {
                longitude,
                latitude,
            })
        } else {
            Err(TypeConstraintError::InvalidCoordinates)
        }
    }

    pub const fn longitude(self) -> f64 {
        self.longitude
    }

    pub const fn latitude(self) -> f64 {
        self.latitude
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(self, other: Coordinates) -> f64 {
        crate::geo::distance(self, other)
    }
}

impl TryFrom<[f64; 2]> for Coordinates {
    type Error = TypeConstraintError;

    fn try_from([longitude, latitude]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(value: Coordinates) -> Self {
        [value.longitude, value.latitude]
    }
}

/// Category a place is filed under.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaceLabel {
    Cafe,
    Shop,
    Hospital,
    #[default]
    Other,
}

impl PlaceLabel {
    /// String representation used in persistence and in the search text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cafe => "CAFE",
            Self::Shop => "SHOP",
            Self::Hospital => "HOSPITAL",
            Self::Other => "OTHER",
        }
    }
}

impl Display for PlaceLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PlaceLabel {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "CAFE" => Ok(Self::Cafe),
            "SHOP" => Ok(Self::Shop),
            "HOSPITAL" => Ok(Self::Hospital),
            "OTHER" => Ok(Self::Other),
            other => Err(TypeConstraintError::InvalidValue(format!("label: {other}"))),
        }
    }
}

impl TryFrom<String> for PlaceLabel {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_place_names() {
        let value = PlaceName::new("  Cafe A  ").unwrap();
        assert_eq!(value.as_str(), "Cafe A");
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = PlaceId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("place_id"));
    }

    #[test]
    fn validates_contact_numbers() {
        assert!(PlaceContact::new("02-123-4567").is_ok());
        assert!(PlaceContact::new("031-1234-5678").is_ok());
        assert!(PlaceContact::new("1234-5678").is_ok());
        assert_eq!(
            PlaceContact::new("call me").unwrap_err(),
            TypeConstraintError::InvalidContact
        );
    }

    #[test]
    fn validates_rating_range() {
        assert!(PlaceRating::new(0.0).is_ok());
        assert!(PlaceRating::new(5.0).is_ok());
        assert_eq!(
            PlaceRating::new(5.1).unwrap_err(),
            TypeConstraintError::InvalidRating
        );
    }

    #[test]
    fn coordinates_round_trip_as_lon_lat_array() {
        let point = Coordinates::new(127.0, 37.5).unwrap();
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(value, serde_json::json!([127.0, 37.5]));

        let err = serde_json::from_value::<Coordinates>(serde_json::json!([37.5, 127.0]));
        assert!(err.is_err());
    }

    #[test]
    fn labels_parse_from_uppercase_names() {
        assert_eq!(PlaceLabel::try_from("CAFE").unwrap(), PlaceLabel::Cafe);
        assert!(PlaceLabel::try_from("cafe").is_err());
        assert_eq!(PlaceLabel::default(), PlaceLabel::Other);
    }

    #[test]
    fn range_must_be_positive() {
        assert_eq!(
            RangeKm::new(0.0).unwrap_err(),
            TypeConstraintError::NonPositiveNumber("range")
        );
    }
}
