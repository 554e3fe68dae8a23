use crate::error::app_error::AppError;
use crate::models::meal::Meal;
use crate::models::reservation::{Reservation, ReservationStatus};

/// The capacity in which a user acts on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationActor {
    /// The user who made the reservation.
    Diner,
    /// The owner of the reserved meal.
    Cook,
}

impl ReservationActor {
    pub fn may_set(self, status: ReservationStatus) -> bool {
        match self {
            ReservationActor::Diner => status == ReservationStatus::Cancelled,
            ReservationActor::Cook => true,
        }
    }
}

/// Decides who `user_id` is with respect to `reservation`. Being the diner takes
/// precedence, so a cook who reserved their own meal can only cancel it.
pub fn reservation_actor(user_id: &str, reservation: &Reservation, meal: &Meal) -> Result<ReservationActor, AppError> {
    if reservation.user_id == user_id {
        Ok(ReservationActor::Diner)
    } else if meal.user_id == user_id {
        Ok(ReservationActor::Cook)
    } else {
        Err(AppError::Forbidden("You do not have permission to update this reservation".to_string()))
    }
}

/// Authorizes moving `reservation` to `status`.
pub fn authorize_reservation_update(user_id: &str, reservation: &Reservation, meal: &Meal, status: ReservationStatus) -> Result<ReservationActor, AppError> {
    let actor = reservation_actor(user_id, reservation, meal)?;
    if !actor.may_set(status) {
        return Err(AppError::Forbidden("Diner can only cancel their reservation".to_string()));
    }
    Ok(actor)
}

/// Meal-level actions (`modify this meal`, `view reservations for this meal`) are owner-only.
pub fn ensure_meal_owner(user_id: &str, meal: &Meal, action: &str) -> Result<(), AppError> {
    if meal.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("You do not have permission to {}", action)))
    }
}
