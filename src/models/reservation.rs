use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub const ALLOWED: &'static str = "confirmed, completed, cancelled";

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Only confirmed -> cancelled gives the servings back to the meal.
    pub fn restores_servings(previous: ReservationStatus, next: ReservationStatus) -> bool {
        previous == ReservationStatus::Confirmed && next == ReservationStatus::Cancelled
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub meal_id: String,
    pub servings: u32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: String,
    pub meal_id: String,
    pub servings: u32,
}

/// Result of an atomic status swap.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: ReservationStatus,
    pub reservation: Reservation,
}

#[derive(Deserialize, Debug, Default, JsonSchema)]
#[serde(default)]
pub struct ReservationRequest {
    pub servings: Option<f64>,
}

#[derive(Deserialize, Debug, Default, JsonSchema)]
#[serde(default)]
pub struct ReservationStatusRequest {
    /// One of `confirmed`, `completed`, `cancelled`
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: String,
    pub user_id: String,
    pub meal_id: String,
    pub servings: u32,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id.clone(),
            user_id: reservation.user_id.clone(),
            meal_id: reservation.meal_id.clone(),
            servings: reservation.servings,
            status: reservation.status,
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}
