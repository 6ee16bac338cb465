//! Helpers for integration tests.

use chrono::Utc;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_places::db::{DbPool, establish_connection_pool};
use pushkind_places::domain::place::{NewPlace, Place};
use pushkind_places::domain::types::{
    Coordinates, PlaceAddress, PlaceContact, PlaceLabel, PlaceName, PlaceRating, UserName,
};
use pushkind_places::domain::user::{NewUser, User};
use pushkind_places::repository::{DieselRepository, PlaceWriter, UserWriter};
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

/// Point `km` kilometers due north of `origin`.
#[allow(dead_code)]
pub fn north_of(origin: [f64; 2], km: f64) -> [f64; 2] {
    [origin[0], origin[1] + km / 111.195]
}

#[allow(dead_code)]
pub fn new_place(name: &str, label: PlaceLabel, location: [f64; 2], rating: f64) -> NewPlace {
    NewPlace {
        name: PlaceName::new(name).expect("valid name"),
        address: PlaceAddress::new("서울 종로구").expect("valid address"),
        label,
        contact: PlaceContact::new("02-123-4567").expect("valid contact"),
        description: None,
        thumbnail: None,
        office_hour: None,
        images: vec![],
        location: Coordinates::try_from(location).expect("valid location"),
        rating: PlaceRating::new(rating).expect("valid rating"),
        query: String::new(),
        created_at: Utc::now().naive_utc(),
    }
    .with_computed_query()
}

#[allow(dead_code)]
pub fn create_place(
    repo: &DieselRepository,
    name: &str,
    label: PlaceLabel,
    location: [f64; 2],
    rating: f64,
) -> Place {
    repo.create_place(&new_place(name, label, location, rating))
        .expect("should create place")
}

#[allow(dead_code)]
pub fn create_user(repo: &DieselRepository, name: &str) -> User {
    repo.create_user(&NewUser {
        name: UserName::new(name).expect("valid user name"),
        created_at: Utc::now().naive_utc(),
    })
    .expect("should create user")
}
