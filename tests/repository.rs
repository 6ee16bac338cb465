use std::thread;

use chrono::Utc;
use diesel::prelude::*;
use pushkind_places::domain::place::{OfficeHour, PlaceUpdate};
use pushkind_places::domain::scrap::ScrapChange;
use pushkind_places::domain::types::{
    Coordinates, ImageUrl, OfficeHourValue, PlaceDescription, PlaceLabel, PlaceName,
};
use pushkind_places::forms::places::SearchPlacesForm;
use pushkind_places::repository::{
    PlaceReader, PlaceSearchQuery, PlaceWriter, RepositoryError, ScrapWriter, UserReader,
};
use pushkind_places::schema::{place_scraps, user_places};
use pushkind_places::services::ServiceError;
use pushkind_places::services::places::{list_user_places, search_places};
use pushkind_places::services::scraps::{DEFAULT_SCRAP_ATTEMPTS, scrap_place, unscrap_place};

mod common;

const X: [f64; 2] = [127.0, 37.5];

#[test]
fn create_place_round_trips_nested_fields() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let mut new_place = common::new_place("Cafe A", PlaceLabel::Cafe, X, 4.0);
    new_place.description = Some(PlaceDescription::new("Hand drip").expect("valid description"));
    new_place.office_hour = Some(OfficeHour {
        default: OfficeHourValue::new("09:00-18:00").expect("valid hours"),
        weekend: None,
        dayoff: Some(OfficeHourValue::new("MON").expect("valid hours")),
    });
    new_place.images = vec![
        ImageUrl::new("https://example.com/1.png").expect("valid url"),
        ImageUrl::new("https://example.com/2.png").expect("valid url"),
    ];
    let new_place = new_place.with_computed_query();

    let created = repo.create_place(&new_place).expect("should create place");
    let loaded = repo
        .get_place_by_id(created.id)
        .expect("should load place")
        .expect("place should exist");

    assert_eq!(loaded, created);
    assert_eq!(loaded.images, new_place.images);
    assert_eq!(loaded.office_hour, new_place.office_hour);
    assert_eq!(loaded.query, new_place.query);
    assert_eq!(loaded.location, Coordinates::try_from(X).unwrap());
    assert!(loaded.scraps.is_empty());
}

#[test]
fn keyword_matches_normalized_fragments() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let cafe = common::create_place(&repo, "카페 A", PlaceLabel::Cafe, X, 3.0);
    let latin = common::create_place(&repo, "Cafe A", PlaceLabel::Cafe, X, 2.0);
    common::create_place(&repo, "약국", PlaceLabel::Hospital, X, 5.0);

    let hits = repo
        .search_places(&PlaceSearchQuery::default().keyword("카ㅍ"))
        .expect("should search");
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![cafe.id]);

    // Case-insensitive, and only a substring once whitespace is gone.
    let hits = repo
        .search_places(&PlaceSearchQuery::default().keyword("FEa"))
        .expect("should search");
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![latin.id]);
}

#[test]
fn keyword_wildcards_are_literal() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    common::create_place(&repo, "Cafe A", PlaceLabel::Cafe, X, 3.0);
    let sale = common::create_place(&repo, "50%_Sale", PlaceLabel::Shop, X, 1.0);

    let hits = repo
        .search_places(&PlaceSearchQuery::default().keyword("%"))
        .expect("should search");
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![sale.id]);
}

#[test]
fn search_filters_by_label_and_orders_by_rating() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let low = common::create_place(&repo, "Low", PlaceLabel::Cafe, X, 1.0);
    common::create_place(&repo, "Shop", PlaceLabel::Shop, X, 5.0);
    let high = common::create_place(&repo, "High", PlaceLabel::Cafe, X, 4.5);

    let hits = repo
        .search_places(&PlaceSearchQuery::default().label(PlaceLabel::Cafe))
        .expect("should search");

    assert_eq!(
        hits.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![high.id, low.id]
    );
    assert!(hits.iter().all(|p| p.label == PlaceLabel::Cafe));
}

#[test]
fn radius_search_keeps_near_and_drops_far() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let near = common::create_place(&repo, "B", PlaceLabel::Cafe, common::north_of(X, 1.0), 1.0);
    let far = common::create_place(&repo, "C", PlaceLabel::Cafe, common::north_of(X, 10.0), 5.0);

    let hits = search_places(
        SearchPlacesForm {
            coordinates: Some(format!("[{}, {}]", X[0], X[1])),
            range: Some("5".to_string()),
            ..Default::default()
        },
        &repo,
    )
    .expect("should search");

    let ids: Vec<_> = hits.iter().map(|hit| hit.place.id).collect();
    assert!(ids.contains(&near.id));
    assert!(!ids.contains(&far.id));
    assert!(hits.iter().all(|hit| hit.distance.is_some_and(|d| d <= 5.0)));
}

#[test]
fn coordinates_without_range_annotate_in_rating_order() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let near = common::create_place(&repo, "B", PlaceLabel::Cafe, common::north_of(X, 1.0), 1.0);
    let far = common::create_place(&repo, "C", PlaceLabel::Cafe, common::north_of(X, 10.0), 5.0);

    let hits = search_places(
        SearchPlacesForm {
            coordinates: Some(format!("[{}, {}]", X[0], X[1])),
            ..Default::default()
        },
        &repo,
    )
    .expect("should search");

    assert_eq!(
        hits.iter().map(|hit| hit.place.id).collect::<Vec<_>>(),
        vec![far.id, near.id]
    );
    let distance = hits[0].distance.expect("distance should be set");
    assert!((distance - 10.0).abs() < 1e-2, "distance was {distance}");
}

#[test]
fn scrap_and_unscrap_update_both_sides() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let place = common::create_place(&repo, "Cafe A", PlaceLabel::Cafe, X, 3.0);
    let user = common::create_user(&repo, "Kim");

    let scrapped = scrap_place(user.id, place.id, DEFAULT_SCRAP_ATTEMPTS, &repo)
        .expect("should scrap");
    assert!(scrapped.is_scrapped_by(user.id));
    let stored_user = repo
        .get_user_by_id(user.id)
        .expect("should load user")
        .expect("user should exist");
    assert_eq!(stored_user.places, vec![place.id]);

    let err = scrap_place(user.id, place.id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap_err();
    assert_eq!(
        err,
        ServiceError::AlreadyLinked {
            user_id: user.id,
            place_id: place.id
        }
    );
    let stored = repo
        .get_place_by_id(place.id)
        .expect("should load place")
        .expect("place should exist");
    assert_eq!(stored.scraps.len(), 1);

    let unscrapped = unscrap_place(user.id, place.id, DEFAULT_SCRAP_ATTEMPTS, &repo)
        .expect("should unscrap");
    assert!(unscrapped.scraps.is_empty());
    let stored_user = repo
        .get_user_by_id(user.id)
        .expect("should load user")
        .expect("user should exist");
    assert!(stored_user.places.is_empty());

    let err = unscrap_place(user.id, place.id, DEFAULT_SCRAP_ATTEMPTS, &repo).unwrap_err();
    assert!(matches!(err, ServiceError::NotLinked { .. }));
}

#[test]
fn stale_scrap_change_is_rejected_without_writes() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let place = common::create_place(&repo, "Cafe A", PlaceLabel::Cafe, X, 3.0);
    let user = common::create_user(&repo, "Kim");

    let first = ScrapChange::link(&user, &place, Utc::now().naive_utc()).expect("unlinked");
    let second = ScrapChange::link(&user, &place, Utc::now().naive_utc()).expect("unlinked");

    repo.apply_scrap_change(&first).expect("first write wins");
    let err = repo.apply_scrap_change(&second).unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let mut conn = test_db.pool().get().expect("should acquire connection");
    let scraps: i64 = place_scraps::table
        .count()
        .get_result(&mut conn)
        .expect("should count scraps");
    let links: i64 = user_places::table
        .count()
        .get_result(&mut conn)
        .expect("should count user places");
    assert_eq!((scraps, links), (1, 1));
}

#[test]
fn concurrent_scraps_link_exactly_once() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let place = common::create_place(&repo, "Cafe A", PlaceLabel::Cafe, X, 3.0);
    let user = common::create_user(&repo, "Kim");

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                scope.spawn(move || scrap_place(user.id, place.id, DEFAULT_SCRAP_ATTEMPTS, &repo))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("scrap thread panicked"))
            .collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        ServiceError::AlreadyLinked { .. } | ServiceError::ConcurrencyConflict { .. }
    )));

    let stored = repo
        .get_place_by_id(place.id)
        .expect("should load place")
        .expect("place should exist");
    assert_eq!(stored.scraps.len(), 1);
    let stored_user = repo
        .get_user_by_id(user.id)
        .expect("should load user")
        .expect("user should exist");
    assert_eq!(stored_user.places, vec![place.id]);
}

#[test]
fn update_recomputes_query_and_rejects_stale_revision() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let place = common::create_place(&repo, "Cafe A", PlaceLabel::Cafe, X, 3.0);

    let mut edited = place.clone();
    edited.apply_update(PlaceUpdate {
        name: Some(PlaceName::new("카페").expect("valid name")),
        ..Default::default()
    });
    let updated = repo.update_place(&edited).expect("should update");

    assert_eq!(updated.revision, place.revision.next());
    assert!(updated.query.starts_with("ㅋㅏㅍㅔ"));
    let hits = repo
        .search_places(&PlaceSearchQuery::default().keyword("캎"))
        .expect("should search");
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![place.id]);

    // `edited` still carries the pre-update revision.
    let err = repo.update_place(&edited).unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[test]
fn delete_place_unlinks_users() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let kept = common::create_place(&repo, "Kept", PlaceLabel::Cafe, X, 3.0);
    let removed = common::create_place(&repo, "Removed", PlaceLabel::Cafe, X, 4.0);
    let user = common::create_user(&repo, "Kim");

    scrap_place(user.id, kept.id, DEFAULT_SCRAP_ATTEMPTS, &repo).expect("should scrap");
    scrap_place(user.id, removed.id, DEFAULT_SCRAP_ATTEMPTS, &repo).expect("should scrap");
    let before = repo
        .get_user_by_id(user.id)
        .expect("should load user")
        .expect("user should exist");

    assert_eq!(repo.delete_place(removed.id).expect("should delete"), 1);
    assert_eq!(repo.delete_place(removed.id).expect("should delete"), 0);

    let after = repo
        .get_user_by_id(user.id)
        .expect("should load user")
        .expect("user should exist");
    assert_eq!(after.places, vec![kept.id]);
    assert!(after.revision > before.revision);
    assert_eq!(
        list_user_places(user.id, &repo)
            .expect("should list")
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>(),
        vec![kept.id]
    );
}
