use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::models::meal::{Meal, MealChanges, MealFilters, MealStatus, NewMeal};
use chrono::Utc;

/// What happened when servings were requested from a meal.
#[derive(Debug, Clone, PartialEq)]
pub enum ServingsOutcome {
    /// Servings were deducted; carries the meal after the deduction.
    Taken(Meal),
    MealNotFound,
    NotOpen,
    Insufficient { available: u32 },
}

#[async_trait::async_trait]
pub trait MealRepository {
    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, AppError>;
    async fn get_meal_by_id(&self, id: &str) -> Result<Option<Meal>, AppError>;
    async fn list_meals(&self, filters: &MealFilters) -> Result<Vec<Meal>, AppError>;
    async fn list_meals_by_user(&self, user_id: &str) -> Result<Vec<Meal>, AppError>;
    async fn update_meal(&self, id: &str, changes: MealChanges) -> Result<Option<Meal>, AppError>;
    /// Checks the meal is open with enough servings and deducts them, atomically.
    async fn take_servings(&self, id: &str, count: u32) -> Result<ServingsOutcome, AppError>;
    /// Gives servings back. Not capped at `servings_total`.
    async fn restore_servings(&self, id: &str, count: u32) -> Result<Option<Meal>, AppError>;
}

#[async_trait::async_trait]
impl MealRepository for InMemoryRepository {
    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, AppError> {
        let mut store = self.write().await;
        let now = Utc::now();
        let meal = Meal {
            id: store.next_id("meal"),
            user_id: meal.user_id,
            title: meal.title,
            description: meal.description,
            tags: meal.tags,
            cost_per_serving: meal.cost_per_serving,
            servings_total: meal.servings_total,
            servings_available: meal.servings_total,
            ready_at: meal.ready_at,
            zip: meal.zip,
            status: MealStatus::Open,
            created_at: now,
            updated_at: now,
        };
        store.meals.push(meal.clone());

        Ok(meal)
    }

    async fn get_meal_by_id(&self, id: &str) -> Result<Option<Meal>, AppError> {
        let store = self.read().await;
        Ok(store.meals.iter().find(|meal| meal.id == id).cloned())
    }

    async fn list_meals(&self, filters: &MealFilters) -> Result<Vec<Meal>, AppError> {
        let store = self.read().await;
        Ok(store.meals.iter().filter(|meal| filters.matches(meal)).cloned().collect())
    }

    async fn list_meals_by_user(&self, user_id: &str) -> Result<Vec<Meal>, AppError> {
        let store = self.read().await;
        Ok(store.meals.iter().filter(|meal| meal.user_id == user_id).cloned().collect())
    }

    async fn update_meal(&self, id: &str, changes: MealChanges) -> Result<Option<Meal>, AppError> {
        let mut store = self.write().await;
        let Some(meal) = store.meals.iter_mut().find(|meal| meal.id == id) else {
            return Ok(None);
        };
        changes.apply_to(meal, Utc::now());

        Ok(Some(meal.clone()))
    }

    async fn take_servings(&self, id: &str, count: u32) -> Result<ServingsOutcome, AppError> {
        let mut store = self.write().await;
        let Some(meal) = store.meals.iter_mut().find(|meal| meal.id == id) else {
            return Ok(ServingsOutcome::MealNotFound);
        };

        if !meal.is_open() {
            return Ok(ServingsOutcome::NotOpen);
        }
        if meal.servings_available < count {
            return Ok(ServingsOutcome::Insufficient {
                available: meal.servings_available,
            });
        }

        if count > 0 {
            meal.servings_available = meal.servings_available.saturating_sub(count);
            meal.updated_at = Utc::now();
        }

        Ok(ServingsOutcome::Taken(meal.clone()))
    }

    async fn restore_servings(&self, id: &str, count: u32) -> Result<Option<Meal>, AppError> {
        let mut store = self.write().await;
        let Some(meal) = store.meals.iter_mut().find(|meal| meal.id == id) else {
            return Ok(None);
        };

        if count > 0 {
            meal.servings_available = meal.servings_available.saturating_add(count);
            meal.updated_at = Utc::now();
        }

        Ok(Some(meal.clone()))
    }
}
