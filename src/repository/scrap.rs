use diesel::prelude::*;

use crate::domain::place::Place;
use crate::domain::scrap::{ScrapChange, ScrapTransition};
use crate::models::place::NewPlaceScrap;
use crate::models::user::NewUserPlace;
use crate::repository::place::{bump_place_revision, load_place};
use crate::repository::user::bump_user_revision;
use crate::repository::{DieselRepository, RepositoryError, RepositoryResult, ScrapWriter};

impl ScrapWriter for DieselRepository {
    fn apply_scrap_change(&self, change: &ScrapChange) -> RepositoryResult<Place> {
        use crate::schema::{place_scraps, user_places};

        let place_id = change.place_id.get();
        let user_id = change.user_id.get();

        let mut conn = self.conn()?;

        // BEGIN IMMEDIATE takes the write lock up front; the revision checks
        // below reject decisions made against an older snapshot.
        conn.immediate_transaction(|conn| {
            bump_place_revision(conn, change.place_id, change.place_revision)?;
            bump_user_revision(conn, change.user_id, change.user_revision)?;

            match change.transition {
                ScrapTransition::Link { created_at } => {
                    diesel::insert_into(place_scraps::table)
                        .values(&NewPlaceScrap {
                            place_id,
                            user_id,
                            created_at,
                        })
                        .execute(conn)?;
                    diesel::insert_into(user_places::table)
                        .values(&NewUserPlace { user_id, place_id })
                        .execute(conn)?;
                }
                ScrapTransition::Unlink => {
                    diesel::delete(
                        place_scraps::table
                            .filter(place_scraps::place_id.eq(place_id))
                            .filter(place_scraps::user_id.eq(user_id)),
                    )
                    .execute(conn)?;
                    let removed = diesel::delete(
                        user_places::table
                            .filter(user_places::user_id.eq(user_id))
                            .filter(user_places::place_id.eq(place_id)),
                    )
                    .execute(conn)?;
                    if removed == 0 {
                        return Err(RepositoryError::Conflict(format!(
                            "user {user_id} no longer lists place {place_id}"
                        )));
                    }
                }
            }

            load_place(conn, place_id)?.ok_or(RepositoryError::NotFound)
        })
    }
}
