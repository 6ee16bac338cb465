use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};

use crate::domain::types::PlaceId;
use crate::forms::places::{
    CreatePlaceForm, CreatePlacePayload, SearchPlacesForm, UpdatePlaceForm, UpdatePlaceFormPayload,
};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::ServiceError;
use crate::services::places::{
    create_place as create_place_service, delete_place as delete_place_service,
    get_place as get_place_service, search_places as search_places_service,
    update_place as update_place_service,
};

#[post("/places")]
pub async fn create_place(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<CreatePlaceForm>,
) -> impl Responder {
    let payload: CreatePlacePayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    match create_place_service(payload, repo.get_ref()) {
        Ok(place) => HttpResponse::Created().json(place),
        Err(err) => error_response(err),
    }
}

#[get("/places")]
pub async fn search_places(
    repo: web::Data<DieselRepository>,
    web::Query(params): web::Query<SearchPlacesForm>,
) -> impl Responder {
    match search_places_service(params, repo.get_ref()) {
        Ok(hits) => HttpResponse::Ok().json(hits),
        Err(err) => error_response(err),
    }
}

#[get("/places/{place_id}")]
pub async fn show_place(
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> impl Responder {
    let Ok(place_id) = PlaceId::new(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match get_place_service(place_id, repo.get_ref()) {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(err) => error_response(err),
    }
}

#[patch("/places/{place_id}")]
pub async fn update_place(
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
    web::Json(form): web::Json<UpdatePlaceForm>,
) -> impl Responder {
    let Ok(place_id) = PlaceId::new(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    let payload: UpdatePlaceFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => return error_response(ServiceError::from(e)),
    };

    match update_place_service(place_id, payload, repo.get_ref()) {
        Ok(place) => HttpResponse::Ok().json(place),
        Err(err) => error_response(err),
    }
}

#[delete("/places/{place_id}")]
pub async fn delete_place(
    repo: web::Data<DieselRepository>,
    path: web::Path<i32>,
) -> impl Responder {
    let Ok(place_id) = PlaceId::new(path.into_inner()) else {
        return HttpResponse::NotFound().finish();
    };

    match delete_place_service(place_id, repo.get_ref()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
