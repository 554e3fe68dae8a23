use crate::auth::CurrentUser;
use crate::config::Config;
use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::meal::{MealQuery, MealRequest, MealResponse, MealUpdateRequest};
use crate::models::reservation::{ReservationRequest, ReservationResponse};
use crate::service::meal::MealService;
use crate::service::reservation::ReservationService;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get, patch, post};
use rocket_okapi::openapi;

/// List open meals in a zip (defaults to the pilot zip)
#[openapi(tag = "Meals")]
#[get("/?<query..>")]
pub async fn list_meals(repo: &State<InMemoryRepository>, config: &State<Config>, query: MealQuery) -> Result<Json<Vec<MealResponse>>, AppError> {
    let service = MealService::new(repo.inner(), &config.pilot.zip);
    let meals = service.list_meals(&query).await?;
    Ok(Json(meals.iter().map(MealResponse::from).collect()))
}

/// List every meal the current user has posted
#[openapi(tag = "Meals")]
#[get("/mine")]
pub async fn list_my_meals(repo: &State<InMemoryRepository>, config: &State<Config>, current_user: CurrentUser) -> Result<Json<Vec<MealResponse>>, AppError> {
    let service = MealService::new(repo.inner(), &config.pilot.zip);
    let meals = service.list_meals_for_user(&current_user).await?;
    Ok(Json(meals.iter().map(MealResponse::from).collect()))
}

/// Post a new meal
#[openapi(tag = "Meals")]
#[post("/", data = "<payload>")]
pub async fn create_meal(
    repo: &State<InMemoryRepository>,
    config: &State<Config>,
    current_user: CurrentUser,
    payload: JsonBody<MealRequest>,
) -> Result<Custom<Json<MealResponse>>, AppError> {
    let service = MealService::new(repo.inner(), &config.pilot.zip);
    let meal = service.create_meal(&current_user, &payload).await?;
    Ok(Custom(Status::Created, Json(MealResponse::from(&meal))))
}

/// Get a meal by ID
#[openapi(tag = "Meals")]
#[get("/<id>")]
pub async fn get_meal(repo: &State<InMemoryRepository>, config: &State<Config>, id: &str) -> Result<Json<MealResponse>, AppError> {
    let service = MealService::new(repo.inner(), &config.pilot.zip);
    let meal = service.get_meal(id).await?;
    Ok(Json(MealResponse::from(&meal)))
}

/// Update some fields of a meal the current user owns
#[openapi(tag = "Meals")]
#[patch("/<id>", data = "<payload>")]
pub async fn update_meal(
    repo: &State<InMemoryRepository>,
    config: &State<Config>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<MealUpdateRequest>,
) -> Result<Json<MealResponse>, AppError> {
    let service = MealService::new(repo.inner(), &config.pilot.zip);
    let meal = service.update_meal(&current_user, id, &payload).await?;
    Ok(Json(MealResponse::from(&meal)))
}

/// Reserve servings of a meal
#[openapi(tag = "Reservations")]
#[post("/<id>/reservations", data = "<payload>")]
pub async fn create_reservation(
    repo: &State<InMemoryRepository>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<ReservationRequest>,
) -> Result<Custom<Json<ReservationResponse>>, AppError> {
    let service = ReservationService::new(repo.inner());
    let reservation = service.create_reservation(&current_user, id, &payload).await?;
    Ok(Custom(Status::Created, Json(ReservationResponse::from(&reservation))))
}

/// List reservations for a meal the current user owns
#[openapi(tag = "Reservations")]
#[get("/<id>/reservations")]
pub async fn list_meal_reservations(repo: &State<InMemoryRepository>, current_user: CurrentUser, id: &str) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let service = ReservationService::new(repo.inner());
    let reservations = service.list_for_meal(&current_user, id).await?;
    Ok(Json(reservations.iter().map(ReservationResponse::from).collect()))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![
        list_meals,
        list_my_meals,
        create_meal,
        get_meal,
        update_meal,
        create_reservation,
        list_meal_reservations
    ]
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{bearer, create_meal, register, test_client};
    use rocket::http::{ContentType, Status};
    use serde_json::Value;

    #[rocket::async_test]
    async fn created_meal_takes_cook_zip_and_full_availability() {
        let client = test_client().await;
        let (cook_id, token) = register(&client, "cook@example.com", "cook").await;

        let meal = create_meal(&client, &token, 5, 0.0).await;
        assert_eq!(meal["userId"], cook_id.as_str());
        assert_eq!(meal["zip"], "93230");
        assert_eq!(meal["servingsTotal"], 5);
        assert_eq!(meal["servingsAvailable"], 5);
        assert_eq!(meal["status"], "open");
        assert_eq!(meal["tags"], serde_json::json!(["mexican"]));
    }

    #[rocket::async_test]
    async fn create_meal_requires_a_token() {
        let client = test_client().await;
        let response = client.post("/meals").header(ContentType::JSON).body("{}").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        let json: Value = response.into_json().await.expect("error json");
        assert_eq!(json["error"], "Authorization token required");

        let response = client
            .post("/meals")
            .header(ContentType::JSON)
            .header(bearer("not-a-token"))
            .body("{}")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
        let json: Value = response.into_json().await.expect("error json");
        assert_eq!(json["error"], "Invalid or expired token");
    }

    #[rocket::async_test]
    async fn create_meal_validates_numbers() {
        let client = test_client().await;
        let (_, token) = register(&client, "cook@example.com", "cook").await;

        let payload = serde_json::json!({
            "title": "Soup",
            "description": "Lentil soup",
            "costPerServing": 1.0,
            "servingsTotal": 0,
            "readyAt": "2025-12-10T18:00"
        });
        let response = client
            .post("/meals")
            .header(ContentType::JSON)
            .header(bearer(&token))
            .body(payload.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let json: Value = response.into_json().await.expect("error json");
        assert_eq!(json["error"], "servingsTotal must be a number >= 1");
    }

    #[rocket::async_test]
    async fn listing_filters_by_zip_and_price() {
        let client = test_client().await;
        let (_, token) = register(&client, "cook@example.com", "cook").await;
        create_meal(&client, &token, 3, 0.0).await;
        create_meal(&client, &token, 3, 4.0).await;

        let all: Value = client.get("/meals").dispatch().await.into_json().await.expect("meals");
        assert_eq!(all.as_array().map(Vec::len), Some(2));

        let free: Value = client.get("/meals?freeOnly=true").dispatch().await.into_json().await.expect("meals");
        assert_eq!(free.as_array().map(Vec::len), Some(1));
        assert_eq!(free[0]["costPerServing"], 0.0);

        let elsewhere: Value = client.get("/meals?zip=10001").dispatch().await.into_json().await.expect("meals");
        assert_eq!(elsewhere.as_array().map(Vec::len), Some(0));
    }

    #[rocket::async_test]
    async fn date_only_from_filter_starts_at_utc_midnight() {
        let client = test_client().await;
        let (_, token) = register(&client, "cook@example.com", "cook").await;
        create_meal(&client, &token, 3, 0.0).await;

        let same_day: Value = client.get("/meals?from=2025-12-10").dispatch().await.into_json().await.expect("meals");
        assert_eq!(same_day.as_array().map(Vec::len), Some(1));

        let later: Value = client.get("/meals?from=2999-01-01").dispatch().await.into_json().await.expect("meals");
        assert_eq!(later.as_array().map(Vec::len), Some(0));
    }

    #[rocket::async_test]
    async fn unknown_meal_is_not_found() {
        let client = test_client().await;
        let response = client.get("/meals/meal_999").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let json: Value = response.into_json().await.expect("error json");
        assert_eq!(json["error"], "Meal not found");
    }

    #[rocket::async_test]
    async fn only_the_owner_can_patch_a_meal() {
        let client = test_client().await;
        let (_, cook) = register(&client, "cook@example.com", "cook").await;
        let (_, diner) = register(&client, "diner@example.com", "diner").await;
        let meal = create_meal(&client, &cook, 3, 0.0).await;
        let uri = format!("/meals/{}", meal["id"].as_str().expect("meal id"));

        let forbidden = client
            .patch(uri.as_str())
            .header(ContentType::JSON)
            .header(bearer(&diner))
            .body(r#"{"status":"closed"}"#)
            .dispatch()
            .await;
        assert_eq!(forbidden.status(), Status::Forbidden);

        let closed = client
            .patch(uri.as_str())
            .header(ContentType::JSON)
            .header(bearer(&cook))
            .body(r#"{"status":"closed","userId":"someone_else"}"#)
            .dispatch()
            .await;
        assert_eq!(closed.status(), Status::Ok);
        let json: Value = closed.into_json().await.expect("meal json");
        assert_eq!(json["status"], "closed");
        assert_eq!(json["userId"], meal["userId"]);

        let listed: Value = client.get("/meals").dispatch().await.into_json().await.expect("meals");
        assert_eq!(listed.as_array().map(Vec::len), Some(0));

        let mine: Value = client.get("/meals/mine").header(bearer(&cook)).dispatch().await.into_json().await.expect("meals");
        assert_eq!(mine.as_array().map(Vec::len), Some(1));
    }

    #[rocket::async_test]
    async fn meal_reservations_are_owner_only() {
        let client = test_client().await;
        let (_, cook) = register(&client, "cook@example.com", "cook").await;
        let (_, diner) = register(&client, "diner@example.com", "diner").await;
        let meal = create_meal(&client, &cook, 3, 0.0).await;
        let uri = format!("/meals/{}/reservations", meal["id"].as_str().expect("meal id"));

        let response = client
            .post(uri.as_str())
            .header(ContentType::JSON)
            .header(bearer(&diner))
            .body(r#"{"servings":1}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);

        let as_diner = client.get(uri.as_str()).header(bearer(&diner)).dispatch().await;
        assert_eq!(as_diner.status(), Status::Forbidden);

        let as_cook: Value = client.get(uri.as_str()).header(bearer(&cook)).dispatch().await.into_json().await.expect("reservations");
        assert_eq!(as_cook.as_array().map(Vec::len), Some(1));
        assert_eq!(as_cook[0]["servings"], 1);
    }
}
