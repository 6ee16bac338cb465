use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::error::{ErrorBadRequest, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest, HttpResponse, web};
use serde::Serialize;

use crate::domain::types::UserId;
use crate::services::ServiceError;

pub mod places;
pub mod scraps;

/// Header carrying the id of the user a request acts for.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// User a request acts for, taken from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(value) = req.headers().get(USER_ID_HEADER) else {
            return ready(Err(ErrorUnauthorized("missing X-User-Id header")));
        };

        let user_id = value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .and_then(|raw| UserId::new(raw).ok());

        ready(user_id.map(CurrentUser).ok_or_else(|| {
            ErrorBadRequest("X-User-Id header must be a positive integer")
        }))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Maps a service error onto a JSON error response.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let message = err.to_string();
    let (mut builder, code) = match &err {
        ServiceError::NotFound(_) => (HttpResponse::NotFound(), "NOT_FOUND"),
        ServiceError::MalformedQuery(_) => (HttpResponse::BadRequest(), "MALFORMED_QUERY"),
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => {
            (HttpResponse::BadRequest(), "INVALID_INPUT")
        }
        ServiceError::AlreadyLinked { .. } => (HttpResponse::Conflict(), "ALREADY_LINKED"),
        ServiceError::NotLinked { .. } => (HttpResponse::Conflict(), "NOT_LINKED"),
        ServiceError::ConcurrencyConflict { .. } => {
            (HttpResponse::Conflict(), "CONCURRENCY_CONFLICT")
        }
        ServiceError::Internal => (HttpResponse::InternalServerError(), "INTERNAL"),
    };

    builder.json(ErrorBody {
        error: code,
        message,
    })
}

/// Registers every HTTP route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(places::create_place)
        .service(places::search_places)
        .service(places::show_place)
        .service(places::update_place)
        .service(places::delete_place)
        .service(scraps::scrap_place)
        .service(scraps::unscrap_place)
        .service(scraps::show_user_places);
}
