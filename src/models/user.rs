use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{PlaceId, Revision, TypeConstraintError, UserName};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

/// Diesel model representing the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub revision: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Diesel model representing the `user_places` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::user_places)]
pub struct UserPlace {
    pub id: i32,
    pub user_id: i32,
    pub place_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::user_places)]
pub struct NewUserPlace {
    pub user_id: i32,
    pub place_id: i32,
}

impl User {
    /// Converts the row plus its ordered `user_places` rows into a domain user.
    pub fn into_domain(self, places: Vec<UserPlace>) -> Result<DomainUser, TypeConstraintError> {
        Ok(DomainUser {
            id: self.id.try_into()?,
            name: UserName::new(self.name)?,
            places: places
                .into_iter()
                .map(|row| PlaceId::new(row.place_id))
                .collect::<Result<_, _>>()?,
            revision: Revision::new(self.revision)?,
            created_at: self.created_at,
        })
    }
}

impl From<DomainNewUser> for NewUser {
    fn from(user: DomainNewUser) -> Self {
        Self {
            name: user.name.into_inner(),
            created_at: user.created_at,
        }
    }
}
