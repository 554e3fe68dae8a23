use crate::auth::CurrentUser;
use crate::database::meal::{MealRepository, ServingsOutcome};
use crate::database::reservation::ReservationRepository;
use crate::error::app_error::AppError;
use crate::models::reservation::{NewReservation, Reservation, ReservationRequest, ReservationStatus, ReservationStatusRequest};
use crate::service::access::{authorize_reservation_update, ensure_meal_owner};
use crate::util::whole_count;
use tracing::{debug, info, warn};

pub struct ReservationService<'a, R> {
    repository: &'a R,
}

impl<'a, R: MealRepository + ReservationRepository + Sync> ReservationService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        ReservationService { repository }
    }

    /// Reserves servings on an open meal. The availability check and the
    /// decrement happen in one store operation.
    pub async fn create_reservation(&self, user: &CurrentUser, meal_id: &str, request: &ReservationRequest) -> Result<Reservation, AppError> {
        let servings = request
            .servings
            .and_then(whole_count)
            .filter(|servings| *servings >= 1)
            .ok_or_else(|| AppError::BadRequest("servings must be a number >= 1".to_string()))?;

        let meal = match self.repository.take_servings(meal_id, servings).await? {
            ServingsOutcome::Taken(meal) => meal,
            ServingsOutcome::MealNotFound => return Err(AppError::meal_not_found()),
            ServingsOutcome::NotOpen => return Err(AppError::MealNotOpen(meal_id.to_string())),
            ServingsOutcome::Insufficient { available } => {
                debug!(meal_id, requested = servings, available, "reservation refused");
                return Err(AppError::InsufficientServings { requested: servings, available });
            }
        };

        let created = self
            .repository
            .create_reservation(NewReservation {
                user_id: user.id.clone(),
                meal_id: meal.id.clone(),
                servings,
            })
            .await;

        match created {
            Ok(reservation) => {
                info!(
                    reservation_id = %reservation.id,
                    meal_id = %meal.id,
                    user_id = %user.id,
                    servings,
                    servings_available = meal.servings_available,
                    "reservation created"
                );
                Ok(reservation)
            }
            Err(e) => {
                warn!(meal_id = %meal.id, servings, error = %e, "reservation not stored, giving servings back");
                self.repository.restore_servings(&meal.id, servings).await?;
                Err(e)
            }
        }
    }

    pub async fn list_for_user(&self, user: &CurrentUser) -> Result<Vec<Reservation>, AppError> {
        self.repository.list_reservations_by_user(&user.id).await
    }

    pub async fn list_for_meal(&self, user: &CurrentUser, meal_id: &str) -> Result<Vec<Reservation>, AppError> {
        let meal = self.repository.get_meal_by_id(meal_id).await?.ok_or_else(AppError::meal_not_found)?;
        ensure_meal_owner(&user.id, &meal, "view reservations for this meal")?;
        self.repository.list_reservations_by_meal(meal_id).await
    }

    pub async fn update_status(&self, user: &CurrentUser, id: &str, request: &ReservationStatusRequest) -> Result<Reservation, AppError> {
        let status = request
            .status
            .as_deref()
            .and_then(|raw| raw.parse::<ReservationStatus>().ok())
            .ok_or_else(|| AppError::BadRequest(format!("Invalid status. Allowed: {}", ReservationStatus::ALLOWED)))?;

        let reservation = self
            .repository
            .get_reservation_by_id(id)
            .await?
            .ok_or_else(AppError::reservation_not_found)?;
        let meal = self
            .repository
            .get_meal_by_id(&reservation.meal_id)
            .await?
            .ok_or_else(AppError::meal_not_found)?;
        let actor = authorize_reservation_update(&user.id, &reservation, &meal, status)?;

        let change = self
            .repository
            .update_reservation_status(id, status)
            .await?
            .ok_or_else(AppError::reservation_not_found)?;

        if ReservationStatus::restores_servings(change.previous, status) {
            self.repository.restore_servings(&meal.id, change.reservation.servings).await?;
        }

        info!(
            reservation_id = %change.reservation.id,
            user_id = %user.id,
            actor = ?actor,
            from = %change.previous,
            to = %status,
            "reservation status updated"
        );
        Ok(change.reservation)
    }
}
