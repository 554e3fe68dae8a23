use crate::models::health::{HealthResponse, StartedAt};
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

/// Liveness probe
#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck(started_at: &State<StartedAt>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: started_at.uptime_seconds(),
        timestamp: Utc::now(),
    })
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
