use actix_web::{HttpResponse, Responder, delete, get, patch, web};

use crate::domain::types::{PlaceId, UserId};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{CurrentUser, error_response};
use crate::services::places::list_user_places as list_user_places_service;
use crate::services::scraps::{
    scrap_place as scrap_place_service, unscrap_place as unscrap_place_service,
};

#[patch("/places/{place_id}/scrap")]
pub async fn scrap_place(
    user: CurrentUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    path: web::Path<i32>,
) -> impl Responder {
    let Ok(place_id) = PlaceId::new(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match scrap_place_service(user.0, place_id, server_config.scrap_attempts, repo.get_ref()) {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(err) => error_response(err),
    }
}

#[delete("/places/{place_id}/scrap")]
pub async fn unscrap_place(
    user: CurrentUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    path: web::Path<i32>,
) -> impl Responder {
    let Ok(place_id) = PlaceId::new(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match unscrap_place_service(user.0, place_id, server_config.scrap_attempts, repo.get_ref()) {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(err) => error_response(err),
    }
}

#[get("/users/{user_id}/places")]
pub async fn show_user_places(
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> impl Responder {
    let Ok(user_id) = UserId::new(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match list_user_places_service(user_id, repo.get_ref()) {
        Ok(places) => HttpResponse::Ok().json(places),
        Err(err) => error_response(err),
    }
}
