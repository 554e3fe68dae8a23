use crate::auth::CurrentUser;
use crate::database::meal::MealRepository;
use crate::error::app_error::AppError;
use crate::models::meal::{Meal, MealChanges, MealFilters, MealQuery, MealRequest, MealStatus, MealUpdateRequest, NewMeal};
use crate::service::access::ensure_meal_owner;
use crate::util::{parse_timestamp, whole_count};
use chrono::{DateTime, Utc};
use tracing::info;

const MISSING_FIELDS: &str = "Missing required fields: title, description, servingsTotal, costPerServing, readyAt";

pub struct MealService<'a, R> {
    repository: &'a R,
    pilot_zip: &'a str,
}

impl<'a, R: MealRepository> MealService<'a, R> {
    pub fn new(repository: &'a R, pilot_zip: &'a str) -> Self {
        MealService { repository, pilot_zip }
    }

    /// Creates an open meal for `user`, in the user's own zip.
    pub async fn create_meal(&self, user: &CurrentUser, request: &MealRequest) -> Result<Meal, AppError> {
        let (Some(title), Some(description), Some(servings_total), Some(cost), Some(ready_at)) = (
            non_empty(request.title.as_deref()),
            non_empty(request.description.as_deref()),
            request.servings_total,
            request.cost_per_serving,
            non_empty(request.ready_at.as_deref()),
        ) else {
            return Err(AppError::BadRequest(MISSING_FIELDS.to_string()));
        };

        let meal = self
            .repository
            .create_meal(NewMeal {
                user_id: user.id.clone(),
                title: title.to_string(),
                description: description.to_string(),
                tags: request.tags.clone().unwrap_or_default(),
                cost_per_serving: validate_cost(cost)?,
                servings_total: validate_servings_total(servings_total)?,
                ready_at: validate_ready_at(ready_at)?,
                zip: user.zip.clone(),
            })
            .await?;

        info!(meal_id = %meal.id, user_id = %user.id, servings = meal.servings_total, "meal created");
        Ok(meal)
    }

    pub async fn list_meals(&self, query: &MealQuery) -> Result<Vec<Meal>, AppError> {
        let filters = MealFilters {
            zip: non_empty(query.zip.as_deref()).unwrap_or(self.pilot_zip).to_string(),
            from: query.from.as_deref().and_then(parse_timestamp),
            free_only: query.free_only.unwrap_or(false),
        };
        self.repository.list_meals(&filters).await
    }

    pub async fn get_meal(&self, id: &str) -> Result<Meal, AppError> {
        self.repository.get_meal_by_id(id).await?.ok_or_else(AppError::meal_not_found)
    }

    pub async fn list_meals_for_user(&self, user: &CurrentUser) -> Result<Vec<Meal>, AppError> {
        self.repository.list_meals_by_user(&user.id).await
    }

    /// Applies the allow-listed fields of `request` to a meal `user` owns.
    pub async fn update_meal(&self, user: &CurrentUser, id: &str, request: &MealUpdateRequest) -> Result<Meal, AppError> {
        let meal = self.get_meal(id).await?;
        ensure_meal_owner(&user.id, &meal, "modify this meal")?;

        let changes = validate_changes(request)?;
        let updated = self.repository.update_meal(id, changes).await?.ok_or_else(AppError::meal_not_found)?;

        info!(meal_id = %updated.id, user_id = %user.id, status = %updated.status, "meal updated");
        Ok(updated)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_servings_total(value: f64) -> Result<u32, AppError> {
    whole_count(value)
        .filter(|servings| *servings >= 1)
        .ok_or_else(|| AppError::BadRequest("servingsTotal must be a number >= 1".to_string()))
}

fn validate_servings_available(value: f64) -> Result<u32, AppError> {
    whole_count(value).ok_or_else(|| AppError::BadRequest("servingsAvailable must be a number >= 0".to_string()))
}

fn validate_cost(value: f64) -> Result<f64, AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::BadRequest("costPerServing must be a non-negative number".to_string()))
    }
}

fn validate_ready_at(value: &str) -> Result<DateTime<Utc>, AppError> {
    parse_timestamp(value).ok_or_else(|| AppError::BadRequest("readyAt must be a valid timestamp".to_string()))
}

fn validate_text(field: &str, value: Option<&String>) -> Result<Option<String>, AppError> {
    match value {
        Some(text) if text.trim().is_empty() => Err(AppError::BadRequest(format!("{} cannot be empty", field))),
        Some(text) => Ok(Some(text.clone())),
        None => Ok(None),
    }
}

fn validate_changes(request: &MealUpdateRequest) -> Result<MealChanges, AppError> {
    let status = request
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<MealStatus>()
                .map_err(|_| AppError::BadRequest(format!("Invalid status. Allowed: {}", MealStatus::ALLOWED)))
        })
        .transpose()?;

    Ok(MealChanges {
        status,
        cost_per_serving: request.cost_per_serving.map(validate_cost).transpose()?,
        servings_total: request.servings_total.map(validate_servings_total).transpose()?,
        servings_available: request.servings_available.map(validate_servings_available).transpose()?,
        ready_at: request.ready_at.as_deref().map(validate_ready_at).transpose()?,
        title: validate_text("title", request.title.as_ref())?,
        description: validate_text("description", request.description.as_ref())?,
        tags: request.tags.clone(),
    })
}
