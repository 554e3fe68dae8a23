use crate::config::Config;
use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest};
use crate::service::auth::AuthService;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;

/// Register a cook or diner in the pilot zip and start a session
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(repo: &State<InMemoryRepository>, config: &State<Config>, payload: JsonBody<RegisterRequest>) -> Result<Custom<Json<AuthResponse>>, AppError> {
    let service = AuthService::new(repo.inner(), &config.auth, &config.pilot);
    let session = service.register(&payload).await?;
    Ok(Custom(Status::Created, Json(session)))
}

/// Log in with email and password
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(repo: &State<InMemoryRepository>, config: &State<Config>, payload: JsonBody<LoginRequest>) -> Result<Json<AuthResponse>, AppError> {
    let service = AuthService::new(repo.inner(), &config.auth, &config.pilot);
    Ok(Json(service.login(&payload).await?))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login]
}
