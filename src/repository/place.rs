use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::place::{NewPlace, Place};
use crate::domain::types::{ImageUrl, PlaceId, Revision};
use crate::models::place::{
    NewPlace as DbNewPlace, NewPlaceImage, Place as DbPlace, PlaceChanges, PlaceImage, PlaceScrap,
};
use crate::repository::{
    DieselRepository, PlaceReader, PlaceSearchQuery, PlaceWriter, RepositoryError,
    RepositoryResult,
};

/// Wraps the keyword in `%` and escapes `LIKE` wildcards with `\`.
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Attaches images and scraps to `rows`, keeping the row order.
fn hydrate_places(conn: &mut SqliteConnection, rows: Vec<DbPlace>) -> RepositoryResult<Vec<Place>> {
    use crate::schema::{place_images, place_scraps};

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let mut images: HashMap<i32, Vec<PlaceImage>> = HashMap::new();
    for image in place_images::table
        .filter(place_images::place_id.eq_any(&ids))
        .order(place_images::id.asc())
        .load::<PlaceImage>(conn)?
    {
        images.entry(image.place_id).or_default().push(image);
    }

    let mut scraps: HashMap<i32, Vec<PlaceScrap>> = HashMap::new();
    for scrap in place_scraps::table
        .filter(place_scraps::place_id.eq_any(&ids))
        .order(place_scraps::id.asc())
        .load::<PlaceScrap>(conn)?
    {
        scraps.entry(scrap.place_id).or_default().push(scrap);
    }

    rows.into_iter()
        .map(|row| -> RepositoryResult<Place> {
            let id = row.id;
            let place = row.into_domain(
                images.remove(&id).unwrap_or_default(),
                scraps.remove(&id).unwrap_or_default(),
            )?;
            Ok(place)
        })
        .collect()
}

pub(crate) fn load_place(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<Option<Place>> {
    use crate::schema::places;

    let row = places::table
        .find(id)
        .first::<DbPlace>(conn)
        .optional()?;

    match row {
        Some(row) => Ok(hydrate_places(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Moves a place from `expected` to the next revision.
///
/// Fails with [`RepositoryError::Conflict`] when another writer got there
/// first and with [`RepositoryError::NotFound`] when the place is gone.
pub(crate) fn bump_place_revision(
    conn: &mut SqliteConnection,
    id: PlaceId,
    expected: Revision,
) -> RepositoryResult<()> {
    use crate::schema::places;

    let affected = diesel::update(
        places::table
            .filter(places::id.eq(id.get()))
            .filter(places::revision.eq(expected.get())),
    )
    .set((
        places::revision.eq(expected.next().get()),
        places::updated_at.eq(Utc::now().naive_utc()),
    ))
    .execute(conn)?;

    if affected > 0 {
        return Ok(());
    }

    let exists = places::table
        .find(id.get())
        .count()
        .get_result::<i64>(conn)?
        > 0;
    if exists {
        Err(RepositoryError::Conflict(format!(
            "place {id} is no longer at revision {}",
            expected.get()
        )))
    } else {
        Err(RepositoryError::NotFound)
    }
}

fn insert_images(
    conn: &mut SqliteConnection,
    place_id: i32,
    images: &[ImageUrl],
) -> QueryResult<usize> {
    use crate::schema::place_images;

    if images.is_empty() {
        return Ok(0);
    }

    let rows: Vec<NewPlaceImage> = images
        .iter()
        .map(|url| NewPlaceImage {
            place_id,
            url: url.as_str().to_string(),
        })
        .collect();

    diesel::insert_into(place_images::table)
        .values(&rows)
        .execute(conn)
}

impl PlaceReader for DieselRepository {
    fn get_place_by_id(&self, id: PlaceId) -> RepositoryResult<Option<Place>> {
        let mut conn = self.conn()?;
        load_place(&mut conn, id.get())
    }

    fn search_places(&self, query: &PlaceSearchQuery) -> RepositoryResult<Vec<Place>> {
        use crate::schema::places;

        if matches!(&query.place_ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let mut items = places::table.into_boxed::<Sqlite>();

        if let Some(keyword) = &query.keyword {
            items = items.filter(
                places::search_query
                    .like(like_pattern(keyword))
                    .escape('\\'),
            );
        }

        if let Some(label) = query.label {
            items = items.filter(places::label.eq(label.as_str()));
        }

        if let Some(place_ids) = &query.place_ids {
            let ids: Vec<i32> = place_ids.iter().map(|id| id.get()).collect();
            items = items.filter(places::id.eq_any(ids));
        }

        if let Some(bbox) = query.bounding_box() {
            items = items.filter(
                places::latitude.between(bbox.min_latitude, bbox.max_latitude),
            );
            if let Some((min_longitude, max_longitude)) = bbox.longitude {
                items = items.filter(places::longitude.between(min_longitude, max_longitude));
            }
        }

        let rows = items
            .order((places::rating.desc(), places::id.asc()))
            .load::<DbPlace>(&mut conn)?;

        hydrate_places(&mut conn, rows)
    }
}

impl PlaceWriter for DieselRepository {
    fn create_place(&self, place: &NewPlace) -> RepositoryResult<Place> {
        use crate::schema::places;

        let mut conn = self.conn()?;
        let db_place: DbNewPlace = place.clone().into();

        conn.immediate_transaction(|conn| {
            let id: i32 = diesel::insert_into(places::table)
                .values(&db_place)
                .returning(places::id)
                .get_result(conn)?;

            insert_images(conn, id, &place.images)?;

            load_place(conn, id)?.ok_or(RepositoryError::NotFound)
        })
    }

    fn update_place(&self, place: &Place) -> RepositoryResult<Place> {
        use crate::schema::{place_images, places};

        let mut conn = self.conn()?;
        let changes = PlaceChanges::from(place);

        conn.immediate_transaction(|conn| {
            bump_place_revision(conn, place.id, place.revision)?;

            diesel::update(places::table.find(place.id.get()))
                .set(&changes)
                .execute(conn)?;

            diesel::delete(place_images::table.filter(place_images::place_id.eq(place.id.get())))
                .execute(conn)?;
            insert_images(conn, place.id.get(), &place.images)?;

            load_place(conn, place.id.get())?.ok_or(RepositoryError::NotFound)
        })
    }

    fn delete_place(&self, id: PlaceId) -> RepositoryResult<usize> {
        use crate::schema::{place_images, place_scraps, places, user_places, users};

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            let user_ids: Vec<i32> = user_places::table
                .filter(user_places::place_id.eq(id.get()))
                .select(user_places::user_id)
                .load(conn)?;

            // Users lose a list entry, so in-flight scrap decisions on them go stale.
            diesel::update(users::table.filter(users::id.eq_any(&user_ids)))
                .set(users::revision.eq(users::revision + 1))
                .execute(conn)?;

            diesel::delete(user_places::table.filter(user_places::place_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(place_scraps::table.filter(place_scraps::place_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(place_images::table.filter(place_images::place_id.eq(id.get())))
                .execute(conn)?;

            let affected = diesel::delete(places::table.find(id.get())).execute(conn)?;
            Ok(affected)
        })
    }
}
