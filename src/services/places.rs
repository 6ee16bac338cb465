use crate::domain::place::Place;
use crate::domain::types::{PlaceId, UserId};
use crate::dto::places::PlaceSearchHit;
use crate::forms::places::{CreatePlacePayload, SearchPlacesForm, UpdatePlaceFormPayload};
use crate::repository::{
    PlaceReader, PlaceSearchQuery, PlaceWriter, RepositoryError, UserReader,
};

use super::{Entity, ServiceError, ServiceResult};

pub fn create_place<R>(payload: CreatePlacePayload, repo: &R) -> ServiceResult<Place>
where
    R: PlaceWriter,
{
    let new_place = payload.into_new_place();

    match repo.create_place(&new_place) {
        Ok(place) => {
            log::info!("Created place {} ({})", place.id, place.name);
            Ok(place)
        }
        Err(e) => {
            log::error!("Failed to create place: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_place<R>(place_id: PlaceId, repo: &R) -> ServiceResult<Place>
where
    R: PlaceReader,
{
    match repo.get_place_by_id(place_id) {
        Ok(Some(place)) => Ok(place),
        Ok(None) => Err(ServiceError::NotFound(Entity::Place(place_id))),
        Err(e) => {
            log::error!("Failed to get place {place_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Runs a search and annotates distances when the query has an origin.
///
/// Results keep the repository order (rating, then id); distance never
/// reorders them.
pub fn search_places<R>(params: SearchPlacesForm, repo: &R) -> ServiceResult<Vec<PlaceSearchHit>>
where
    R: PlaceReader,
{
    let query = PlaceSearchQuery::try_from(params)?;

    let places = repo.search_places(&query).map_err(|e| {
        log::error!("Failed to search places: {e}");
        ServiceError::Internal
    })?;

    Ok(annotate_distances(places, &query))
}

/// Drops candidates outside the exact radius and attaches distances.
///
/// The repository only prefilters by bounding box, so the radius check here
/// is what makes the range filter exact.
pub fn annotate_distances(places: Vec<Place>, query: &PlaceSearchQuery) -> Vec<PlaceSearchHit> {
    let Some(origin) = query.origin else {
        return places
            .into_iter()
            .map(|place| PlaceSearchHit {
                place,
                distance: None,
            })
            .collect();
    };

    places
        .into_iter()
        .filter_map(|place| {
            let distance = origin.distance_km(place.location);
            match query.range {
                Some(range) if distance > range.get() => None,
                _ => Some(PlaceSearchHit {
                    place,
                    distance: Some(distance),
                }),
            }
        })
        .collect()
}

pub fn update_place<R>(
    place_id: PlaceId,
    payload: UpdatePlaceFormPayload,
    repo: &R,
) -> ServiceResult<Place>
where
    R: PlaceReader + PlaceWriter,
{
    let mut place = get_place(place_id, repo)?;
    place.apply_update(payload.update);

    match repo.update_place(&place) {
        Ok(place) => Ok(place),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound(Entity::Place(place_id))),
        Err(RepositoryError::Conflict(reason)) => {
            log::warn!("Update of place {place_id} lost a race: {reason}");
            Err(ServiceError::ConcurrencyConflict {
                place_id,
                attempts: 1,
            })
        }
        Err(e) => {
            log::error!("Failed to update place {place_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn delete_place<R>(place_id: PlaceId, repo: &R) -> ServiceResult<()>
where
    R: PlaceWriter,
{
    match repo.delete_place(place_id) {
        Ok(0) => Err(ServiceError::NotFound(Entity::Place(place_id))),
        Ok(_) => {
            log::info!("Deleted place {place_id}");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to delete place {place_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Places a user has scrapped, in the order they were scrapped.
pub fn list_user_places<R>(user_id: UserId, repo: &R) -> ServiceResult<Vec<Place>>
where
    R: UserReader + PlaceReader,
{
    let user = match repo.get_user_by_id(user_id) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ServiceError::NotFound(Entity::User(user_id))),
        Err(e) => {
            log::error!("Failed to get user {user_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let query = PlaceSearchQuery::default().places(user.places.clone());
    let mut places = repo.search_places(&query).map_err(|e| {
        log::error!("Failed to list places of user {user_id}: {e}");
        ServiceError::Internal
    })?;

    places.sort_by_key(|place| {
        user.places
            .iter()
            .position(|id| *id == place.id)
            .unwrap_or(usize::MAX)
    });
    Ok(places)
}
