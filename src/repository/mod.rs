use crate::db::{DbConnection, DbPool};
use crate::domain::place::{NewPlace, Place};
use crate::domain::scrap::ScrapChange;
use crate::domain::types::{Coordinates, PlaceId, PlaceLabel, RangeKm, UserId};
use crate::domain::user::{NewUser, User};
use crate::geo::BoundingBox;
use crate::normalize::normalize;

pub mod errors;
pub mod place;
pub mod scrap;
pub mod user;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Filters applied when searching places. All set filters are combined
/// with AND; results come back ordered by descending rating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceSearchQuery {
    /// Normalized keyword matched as a substring of the stored search text.
    pub keyword: Option<String>,
    /// Exact label match.
    pub label: Option<PlaceLabel>,
    /// Reference point for distance annotation.
    pub origin: Option<Coordinates>,
    /// Radius around `origin`; only meaningful together with it.
    pub range: Option<RangeKm>,
    /// Restrict to exactly these ids.
    pub place_ids: Option<Vec<PlaceId>>,
}

impl PlaceSearchQuery {
    /// Normalizes `keyword`; a keyword that normalizes to nothing is dropped.
    pub fn keyword(mut self, keyword: &str) -> Self {
        let normalized = normalize(keyword);
        self.keyword = (!normalized.is_empty()).then_some(normalized);
        self
    }

    pub fn label(mut self, label: PlaceLabel) -> Self {
        self.label = Some(label);
        self
    }

    pub fn near(mut self, origin: Coordinates) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn within(mut self, origin: Coordinates, range: RangeKm) -> Self {
        self.origin = Some(origin);
        self.range = Some(range);
        self
    }

    pub fn places(mut self, place_ids: Vec<PlaceId>) -> Self {
        self.place_ids = Some(place_ids);
        self
    }

    /// Index-friendly prefilter for the radius, if one is requested.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match (self.origin, self.range) {
            (Some(origin), Some(range)) => Some(BoundingBox::around(origin, range)),
            _ => None,
        }
    }
}

/// Read-only operations for place entities.
pub trait PlaceReader {
    /// Retrieve a place by its identifier.
    fn get_place_by_id(&self, id: PlaceId) -> RepositoryResult<Option<Place>>;
    /// List places matching the keyword, label and id filters and falling
    /// inside the bounding box of the radius, ordered by descending rating.
    ///
    /// The exact radius check is left to the caller.
    fn search_places(&self, query: &PlaceSearchQuery) -> RepositoryResult<Vec<Place>>;
}

/// Write operations for place entities.
pub trait PlaceWriter {
    /// Persist a new place together with its images.
    fn create_place(&self, place: &NewPlace) -> RepositoryResult<Place>;
    /// Overwrite a place if it is still at `place.revision`, bumping the
    /// revision. Fails with [`RepositoryError::Conflict`] otherwise.
    fn update_place(&self, place: &Place) -> RepositoryResult<Place>;
    /// Delete a place and both sides of every scrap pointing at it.
    fn delete_place(&self, id: PlaceId) -> RepositoryResult<usize>;
}

/// Read-only operations for user entities.
pub trait UserReader {
    /// Retrieve a user, including the ordered list of scrapped places.
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
}

/// Write operations for user entities.
pub trait UserWriter {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
}

/// Persists scrap transitions across the place and the user document.
pub trait ScrapWriter {
    /// Apply `change` to both documents atomically, provided both are still
    /// at the revisions recorded in the change. Returns the updated place.
    fn apply_scrap_change(&self, change: &ScrapChange) -> RepositoryResult<Place>;
}
