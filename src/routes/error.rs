use crate::auth::AuthFailure;
use crate::error::app_error::{ErrorBody, json_error};
use crate::error::json::BodyRejection;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct NotFoundBody {
    pub error: &'static str,
    pub path: String,
}

fn body_rejection(req: &Request<'_>) -> Option<String> {
    req.local_cache(|| None::<BodyRejection>).as_ref().map(|r| r.0.clone())
}

#[catch(400)]
pub fn bad_request(req: &Request) -> Custom<Json<ErrorBody>> {
    json_error(Status::BadRequest, body_rejection(req).unwrap_or_else(|| "Bad request".to_string()))
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> Custom<Json<ErrorBody>> {
    let failure = req.local_cache(|| None::<AuthFailure>).as_ref().copied().unwrap_or(AuthFailure::MissingToken);
    json_error(Status::Unauthorized, failure.message())
}

#[catch(404)]
pub fn not_found(req: &Request) -> Json<NotFoundBody> {
    Json(NotFoundBody {
        error: "Not Found",
        path: req.uri().path().to_string(),
    })
}

#[catch(413)]
pub fn payload_too_large(req: &Request) -> Custom<Json<ErrorBody>> {
    json_error(Status::PayloadTooLarge, body_rejection(req).unwrap_or_else(|| "Request body is too large".to_string()))
}

#[catch(422)]
pub fn unprocessable_entity(req: &Request) -> Custom<Json<ErrorBody>> {
    json_error(Status::UnprocessableEntity, body_rejection(req).unwrap_or_else(|| "Unprocessable request".to_string()))
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Custom<Json<ErrorBody>> {
    json_error(Status::InternalServerError, "Internal server error")
}
