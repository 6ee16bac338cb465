//! Scrap and unscrap a place on behalf of a user.
//!
//! Each attempt reads both documents, decides the transition against that
//! snapshot and hands the repository a [`ScrapChange`] guarded by the read
//! revisions. A lost race is re-read and retried up to `attempts` times.

use chrono::{NaiveDateTime, Utc};

use crate::domain::place::Place;
use crate::domain::scrap::{ScrapChange, ScrapError};
use crate::domain::types::{PlaceId, UserId};
use crate::domain::user::User;
use crate::repository::{PlaceReader, RepositoryError, ScrapWriter, UserReader};

use super::{Entity, ServiceError, ServiceResult};

pub const DEFAULT_SCRAP_ATTEMPTS: usize = 3;

/// Add `place_id` to the user's scraps. Fails with
/// [`ServiceError::AlreadyLinked`] when it is already there.
pub fn scrap_place<R>(
    user_id: UserId,
    place_id: PlaceId,
    attempts: usize,
    repo: &R,
) -> ServiceResult<Place>
where
    R: PlaceReader + UserReader + ScrapWriter,
{
    apply_with_retry(user_id, place_id, attempts, repo, |user, place| {
        let now: NaiveDateTime = Utc::now().naive_utc();
        ScrapChange::link(user, place, now)
    })
}

/// Remove `place_id` from the user's scraps. Fails with
/// [`ServiceError::NotLinked`] when it is not there.
pub fn unscrap_place<R>(
    user_id: UserId,
    place_id: PlaceId,
    attempts: usize,
    repo: &R,
) -> ServiceResult<Place>
where
    R: PlaceReader + UserReader + ScrapWriter,
{
    apply_with_retry(user_id, place_id, attempts, repo, ScrapChange::unlink)
}

fn load_pair<R>(user_id: UserId, place_id: PlaceId, repo: &R) -> ServiceResult<(User, Place)>
where
    R: PlaceReader + UserReader,
{
    let place = match repo.get_place_by_id(place_id) {
        Ok(Some(place)) => place,
        Ok(None) => return Err(ServiceError::NotFound(Entity::Place(place_id))),
        Err(e) => {
            log::error!("Failed to get place {place_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let user = match repo.get_user_by_id(user_id) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ServiceError::NotFound(Entity::User(user_id))),
        Err(e) => {
            log::error!("Failed to get user {user_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok((user, place))
}

fn apply_with_retry<R, F>(
    user_id: UserId,
    place_id: PlaceId,
    attempts: usize,
    repo: &R,
    decide: F,
) -> ServiceResult<Place>
where
    R: PlaceReader + UserReader + ScrapWriter,
    F: Fn(&User, &Place) -> Result<ScrapChange, ScrapError>,
{
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let (user, place) = load_pair(user_id, place_id, repo)?;
        let change = decide(&user, &place)?;

        match repo.apply_scrap_change(&change) {
            Ok(place) => return Ok(place),
            // A document vanished or moved on since it was read; the next
            // read reports which.
            Err(RepositoryError::Conflict(reason)) => {
                log::warn!(
                    "Scrap write for user {user_id} on place {place_id} lost a race \
                     (attempt {attempt}/{attempts}): {reason}"
                );
            }
            Err(RepositoryError::NotFound) => {
                log::warn!(
                    "Scrap write for user {user_id} on place {place_id} found a document \
                     missing (attempt {attempt}/{attempts})"
                );
            }
            Err(e) => {
                log::error!("Failed to write scrap for user {user_id} on place {place_id}: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    log::error!("Giving up scrap write for user {user_id} on place {place_id} after {attempts} attempt(s)");
    Err(ServiceError::ConcurrencyConflict { place_id, attempts })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::place::fixtures::sample_place;
    use crate::domain::types::{Revision, UserName};
    use crate::repository::test::TestRepository;

    fn user(id: i32) -> User {
        User {
            id: UserId::new(id).unwrap(),
            name: UserName::new("Kim").unwrap(),
            places: vec![],
            revision: Revision::INITIAL,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn ids() -> (UserId, PlaceId) {
        (UserId::new(7).unwrap(), PlaceId::new(1).unwrap())
    }

    fn repo() -> TestRepository {
        TestRepository::new(vec![sample_place(1, "Cafe A", [127.0, 37.5])], vec![user(7)])
    }

    #[test]
    fn scrap_links_both_sides() {
        let repo = repo();
        let (user_id, place_id) = ids();

        let place = scrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap();

        assert_eq!(place.scraps.len(), 1);
        assert_eq!(place.scraps[0].user, user_id);
        assert_eq!(repo.user(user_id).unwrap().places, vec![place_id]);
    }

    #[test]
    fn scrapping_twice_is_rejected_without_duplicates() {
        let repo = repo();
        let (user_id, place_id) = ids();

        scrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap();
        let err = scrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap_err();

        assert_eq!(err, ServiceError::AlreadyLinked { user_id, place_id });
        assert_eq!(repo.place(place_id).unwrap().scraps.len(), 1);
        assert_eq!(repo.user(user_id).unwrap().places.len(), 1);
    }

    #[test]
    fn unscrap_removes_both_sides() {
        let repo = repo();
        let (user_id, place_id) = ids();

        scrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap();
        let place = unscrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap();

        assert!(place.scraps.is_empty());
        assert!(repo.user(user_id).unwrap().places.is_empty());
    }

    #[test]
    fn unscrap_without_scrap_is_rejected() {
        let repo = repo();
        let (user_id, place_id) = ids();

        let err = unscrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap_err();

        assert_eq!(err, ServiceError::NotLinked { user_id, place_id });
        assert_eq!(repo.scrap_writes(), 0);
    }

    #[test]
    fn missing_documents_are_reported() {
        let repo = repo();
        let (user_id, _) = ids();
        let missing_place = PlaceId::new(99).unwrap();
        let missing_user = UserId::new(99).unwrap();

        assert_eq!(
            scrap_place(user_id, missing_place, 1, &repo).unwrap_err(),
            ServiceError::NotFound(Entity::Place(missing_place))
        );
        assert_eq!(
            scrap_place(missing_user, PlaceId::new(1).unwrap(), 1, &repo).unwrap_err(),
            ServiceError::NotFound(Entity::User(missing_user))
        );
    }

    #[test]
    fn lost_race_is_retried() {
        let repo = repo().with_conflicts(1);
        let (user_id, place_id) = ids();

        let place = scrap_place(user_id, place_id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap();

        assert_eq!(repo.scrap_writes(), 2);
        assert_eq!(place.scraps.len(), 1);
        assert_eq!(repo.user(user_id).unwrap().places, vec![place_id]);
    }

    #[test]
    fn exhausted_retries_leave_documents_untouched() {
        let repo = repo().with_conflicts(5);
        let (user_id, place_id) = ids();

        let err = scrap_place(user_id, place_id, 3, &repo).unwrap_err();

        assert_eq!(
            err,
            ServiceError::ConcurrencyConflict {
                place_id,
                attempts: 3
            }
        );
        assert_eq!(repo.scrap_writes(), 3);
        assert!(repo.place(place_id).unwrap().scraps.is_empty());
        assert!(repo.user(user_id).unwrap().places.is_empty());
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let repo = repo();
        let (user_id, place_id) = ids();

        scrap_place(user_id, place_id, 0, &repo).unwrap();
        assert_eq!(repo.scrap_writes(), 1);
    }
}
