use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::models::reservation::{NewReservation, Reservation, ReservationStatus, StatusChange};
use chrono::Utc;

#[async_trait::async_trait]
pub trait ReservationRepository {
    /// Stores a reservation in `confirmed` state.
    async fn create_reservation(&self, reservation: NewReservation) -> Result<Reservation, AppError>;
    async fn get_reservation_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError>;
    async fn list_reservations_by_user(&self, user_id: &str) -> Result<Vec<Reservation>, AppError>;
    async fn list_reservations_by_meal(&self, meal_id: &str) -> Result<Vec<Reservation>, AppError>;
    /// Swaps the status atomically and reports the one it replaced.
    async fn update_reservation_status(&self, id: &str, status: ReservationStatus) -> Result<Option<StatusChange>, AppError>;
}

#[async_trait::async_trait]
impl ReservationRepository for InMemoryRepository {
    async fn create_reservation(&self, reservation: NewReservation) -> Result<Reservation, AppError> {
        let mut store = self.write().await;
        let now = Utc::now();
        let reservation = Reservation {
            id: store.next_id("resv"),
            user_id: reservation.user_id,
            meal_id: reservation.meal_id,
            servings: reservation.servings,
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };
        store.reservations.push(reservation.clone());

        Ok(reservation)
    }

    async fn get_reservation_by_id(&self, id: &str) -> Result<Option<Reservation>, AppError> {
        let store = self.read().await;
        Ok(store.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reservations_by_user(&self, user_id: &str) -> Result<Vec<Reservation>, AppError> {
        let store = self.read().await;
        Ok(store.reservations.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn list_reservations_by_meal(&self, meal_id: &str) -> Result<Vec<Reservation>, AppError> {
        let store = self.read().await;
        Ok(store.reservations.iter().filter(|r| r.meal_id == meal_id).cloned().collect())
    }

    async fn update_reservation_status(&self, id: &str, status: ReservationStatus) -> Result<Option<StatusChange>, AppError> {
        let mut store = self.write().await;
        let Some(reservation) = store.reservations.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        let previous = reservation.status;
        reservation.status = status;
        reservation.updated_at = Utc::now();

        Ok(Some(StatusChange {
            previous,
            reservation: reservation.clone(),
        }))
    }
}
