use crate::auth::CurrentUser;
use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::reservation::{ReservationResponse, ReservationStatusRequest};
use crate::service::reservation::ReservationService;
use rocket::serde::json::Json;
use rocket::{State, get, patch};
use rocket_okapi::openapi;

/// List reservations made by the current user
#[openapi(tag = "Reservations")]
#[get("/mine")]
pub async fn list_my_reservations(repo: &State<InMemoryRepository>, current_user: CurrentUser) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let service = ReservationService::new(repo.inner());
    let reservations = service.list_for_user(&current_user).await?;
    Ok(Json(reservations.iter().map(ReservationResponse::from).collect()))
}

/// Change a reservation's status. Diners may only cancel; the meal's cook may set any status.
#[openapi(tag = "Reservations")]
#[patch("/<id>", data = "<payload>")]
pub async fn update_reservation_status(
    repo: &State<InMemoryRepository>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<ReservationStatusRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let service = ReservationService::new(repo.inner());
    let reservation = service.update_status(&current_user, id, &payload).await?;
    Ok(Json(ReservationResponse::from(&reservation)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_my_reservations, update_reservation_status]
}
