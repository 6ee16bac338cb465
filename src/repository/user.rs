use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::types::{Revision, UserId};
use crate::domain::user::{NewUser, User};
use crate::models::user::{NewUser as DbNewUser, User as DbUser, UserPlace};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, UserReader, UserWriter,
};

pub(crate) fn load_user(conn: &mut SqliteConnection, id: i32) -> RepositoryResult<Option<User>> {
    use crate::schema::{user_places, users};

    let Some(row) = users::table.find(id).first::<DbUser>(conn).optional()? else {
        return Ok(None);
    };

    let places = user_places::table
        .filter(user_places::user_id.eq(id))
        .order(user_places::id.asc())
        .load::<UserPlace>(conn)?;

    Ok(Some(row.into_domain(places)?))
}

/// Counterpart of [`crate::repository::place::bump_place_revision`] for users.
pub(crate) fn bump_user_revision(
    conn: &mut SqliteConnection,
    id: UserId,
    expected: Revision,
) -> RepositoryResult<()> {
    use crate::schema::users;

    let affected = diesel::update(
        users::table
            .filter(users::id.eq(id.get()))
            .filter(users::revision.eq(expected.get())),
    )
    .set(users::revision.eq(expected.next().get()))
    .execute(conn)?;

    if affected > 0 {
        return Ok(());
    }

    let exists = users::table.find(id.get()).count().get_result::<i64>(conn)? > 0;
    if exists {
        Err(RepositoryError::Conflict(format!(
            "user {id} is no longer at revision {}",
            expected.get()
        )))
    } else {
        Err(RepositoryError::NotFound)
    }
}

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let mut conn = self.conn()?;
        load_user(&mut conn, id.get())
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user: DbNewUser = user.clone().into();

        let id: i32 = diesel::insert_into(users::table)
            .values(&db_user)
            .returning(users::id)
            .get_result(&mut conn)?;

        load_user(&mut conn, id)?.ok_or(RepositoryError::NotFound)
    }
}
