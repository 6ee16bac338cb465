//! Scrap relationship between a user and a place.
//!
//! The relationship is stored twice: as a [`Scrap`] entry in `place.scraps`
//! and as the place id in `user.places`. The functions here decide whether a
//! transition is allowed and describe the write as a [`ScrapChange`] that a
//! repository applies to both documents at once, guarded by the revisions the
//! decision was made against.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::place::{Place, Scrap};
use crate::domain::types::{PlaceId, Revision, UserId};
use crate::domain::user::User;

/// Link state of a `(user, place)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrapState {
    Unlinked,
    Linked,
}

impl ScrapState {
    /// The user's list is authoritative for the precondition checks.
    pub fn of(user: &User, place: &Place) -> Self {
        if user.has_scrapped(place.id) {
            Self::Linked
        } else {
            Self::Unlinked
        }
    }
}

/// Precondition violations of the scrap state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScrapError {
    #[error("user {user_id} has already scrapped place {place_id}")]
    AlreadyLinked { user_id: UserId, place_id: PlaceId },
    #[error("user {user_id} has not scrapped place {place_id}")]
    NotLinked { user_id: UserId, place_id: PlaceId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrapTransition {
    Link { created_at: NaiveDateTime },
    Unlink,
}

/// A two-document write valid only while both documents are still at the
/// recorded revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapChange {
    pub user_id: UserId,
    pub place_id: PlaceId,
    pub user_revision: Revision,
    pub place_revision: Revision,
    pub transition: ScrapTransition,
}

impl ScrapChange {
    /// `Unlinked -> Linked`.
    pub fn link(user: &User, place: &Place, now: NaiveDateTime) -> Result<Self, ScrapError> {
        if ScrapState::of(user, place) == ScrapState::Linked {
            return Err(ScrapError::AlreadyLinked {
                user_id: user.id,
                place_id: place.id,
            });
        }
        Ok(Self::new(user, place, ScrapTransition::Link { created_at: now }))
    }

    /// `Linked -> Unlinked`.
    pub fn unlink(user: &User, place: &Place) -> Result<Self, ScrapError> {
        if ScrapState::of(user, place) == ScrapState::Unlinked {
            return Err(ScrapError::NotLinked {
                user_id: user.id,
                place_id: place.id,
            });
        }
        Ok(Self::new(user, place, ScrapTransition::Unlink))
    }

    fn new(user: &User, place: &Place, transition: ScrapTransition) -> Self {
        Self {
            user_id: user.id,
            place_id: place.id,
            user_revision: user.revision,
            place_revision: place.revision,
            transition,
        }
    }

    /// Whether both documents are still at the revisions this change expects.
    pub fn is_current(&self, user: &User, place: &Place) -> bool {
        user.id == self.user_id
            && place.id == self.place_id
            && user.revision == self.user_revision
            && place.revision == self.place_revision
    }

    /// Applies the change to in-memory copies of both documents and bumps
    /// their revisions.
    pub fn apply(&self, user: &mut User, place: &mut Place) {
        match self.transition {
            ScrapTransition::Link { created_at } => {
                if !place.is_scrapped_by(self.user_id) {
                    place.scraps.push(Scrap {
                        user: self.user_id,
                        created_at,
                    });
                }
                if !user.has_scrapped(self.place_id) {
                    user.places.push(self.place_id);
                }
            }
            ScrapTransition::Unlink => {
                place.scraps.retain(|scrap| scrap.user != self.user_id);
                user.places.retain(|id| *id != self.place_id);
            }
        }
        user.revision = user.revision.next();
        place.revision = place.revision.next();
    }
}
