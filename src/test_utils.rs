use crate::auth::CurrentUser;
use crate::database::meal::{MealRepository, ServingsOutcome};
use crate::database::memory_repository::InMemoryRepository;
use crate::database::reservation::ReservationRepository;
use crate::error::app_error::AppError;
use crate::models::meal::{Meal, MealChanges, MealFilters, MealRequest, MealStatus, NewMeal};
use crate::models::reservation::{NewReservation, Reservation, ReservationStatus, StatusChange};
use crate::models::user::{User, UserRole};
use crate::{Config, build_rocket};
use chrono::{DateTime, TimeZone, Utc};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;

pub const PILOT_ZIP: &str = "93230";

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap()
}

fn ready_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 10, 18, 0, 0).unwrap()
}

pub fn new_meal(user_id: &str, servings: u32) -> NewMeal {
    NewMeal {
        user_id: user_id.to_string(),
        title: "Tamales".to_string(),
        description: "Pork and green chile tamales".to_string(),
        tags: vec!["mexican".to_string()],
        cost_per_serving: 0.0,
        servings_total: servings,
        ready_at: ready_at(),
        zip: PILOT_ZIP.to_string(),
    }
}

pub fn meal_request(servings: i64, cost: f64) -> MealRequest {
    MealRequest {
        title: Some("Tamales".to_string()),
        description: Some("Pork and green chile tamales".to_string()),
        tags: None,
        cost_per_serving: Some(cost),
        servings_total: Some(servings as f64),
        ready_at: Some("2025-12-10T18:00".to_string()),
    }
}

pub fn sample_user(id: &str, email: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role,
        zip: PILOT_ZIP.to_string(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn current_user(id: &str, role: UserRole) -> CurrentUser {
    CurrentUser::from(&sample_user(id, &format!("{}@example.com", id), role))
}

pub fn sample_meal(id: &str, owner_id: &str) -> Meal {
    Meal {
        id: id.to_string(),
        user_id: owner_id.to_string(),
        title: "Tamales".to_string(),
        description: "Pork and green chile tamales".to_string(),
        tags: Vec::new(),
        cost_per_serving: 0.0,
        servings_total: 5,
        servings_available: 5,
        ready_at: ready_at(),
        zip: PILOT_ZIP.to_string(),
        status: MealStatus::Open,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub fn sample_reservation(id: &str, user_id: &str, meal_id: &str) -> Reservation {
    Reservation {
        id: id.to_string(),
        user_id: user_id.to_string(),
        meal_id: meal_id.to_string(),
        servings: 2,
        status: ReservationStatus::Confirmed,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Store whose reservation inserts always fail, for exercising the
/// servings give-back path. Meal operations go to a real in-memory store.
#[derive(Default)]
pub struct FailingReservations {
    inner: InMemoryRepository,
}

#[async_trait::async_trait]
impl MealRepository for FailingReservations {
    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, AppError> {
        self.inner.create_meal(meal).await
    }

    async fn get_meal_by_id(&self, id: &str) -> Result<Option<Meal>, AppError> {
        self.inner.get_meal_by_id(id).await
    }

    async fn list_meals(&self, filters: &MealFilters) -> Result<Vec<Meal>, AppError> {
        self.inner.list_meals(filters).await
    }

    async fn list_meals_by_user(&self, user_id: &str) -> Result<Vec<Meal>, AppError> {
        self.inner.list_meals_by_user(user_id).await
    }

    async fn update_meal(&self, id: &str, changes: MealChanges) -> Result<Option<Meal>, AppError> {
        self.inner.update_meal(id, changes).await
    }

    async fn take_servings(&self, id: &str, count: u32) -> Result<ServingsOutcome, AppError> {
        self.inner.take_servings(id, count).await
    }

    async fn restore_servings(&self, id: &str, count: u32) -> Result<Option<Meal>, AppError> {
        self.inner.restore_servings(id, count).await
    }
}

#[async_trait::async_trait]
impl ReservationRepository for FailingReservations {
    async fn create_reservation(&self, _reservation: NewReservation) -> Result<Reservation, AppError> {
        Err(AppError::BadRequest("reservation store unavailable".to_string()))
    }

    async fn get_reservation_by_id(&self, _id: &str) -> Result<Option<Reservation>, AppError> {
        Ok(None)
    }

    async fn list_reservations_by_user(&self, _user_id: &str) -> Result<Vec<Reservation>, AppError> {
        Ok(Vec::new())
    }

    async fn list_reservations_by_meal(&self, _meal_id: &str) -> Result<Vec<Reservation>, AppError> {
        Ok(Vec::new())
    }

    async fn update_reservation_status(&self, _id: &str, _status: ReservationStatus) -> Result<Option<StatusChange>, AppError> {
        Ok(None)
    }
}

pub async fn test_client() -> Client {
    client_with(Config::default()).await
}

pub async fn client_with(config: Config) -> Client {
    Client::tracked(build_rocket(config)).await.expect("valid rocket instance")
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

/// Registers a user in the pilot zip and returns `(user id, token)`.
pub async fn register(client: &Client, email: &str, role: &str) -> (String, String) {
    let payload = serde_json::json!({
        "name": "Test User",
        "email": email,
        "password": "password123",
        "role": role,
        "zip": PILOT_ZIP
    });

    let response = client
        .post("/auth/register")
        .header(ContentType::JSON)
        .body(payload.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let json: Value = response.into_json().await.expect("auth response json");
    let user_id = json["user"]["id"].as_str().expect("user id").to_string();
    let token = json["token"].as_str().expect("token").to_string();
    (user_id, token)
}

/// Creates a meal through the API and returns its JSON.
pub async fn create_meal(client: &Client, token: &str, servings: i64, cost: f64) -> Value {
    let payload = serde_json::json!({
        "title": "Tamales",
        "description": "Pork and green chile tamales",
        "tags": ["mexican"],
        "costPerServing": cost,
        "servingsTotal": servings,
        "readyAt": "2025-12-10T18:00:00Z"
    });

    let response = client
        .post("/meals")
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(payload.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    response.into_json().await.expect("meal json")
}
