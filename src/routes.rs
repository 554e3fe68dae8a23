pub mod auth;
pub mod error;
pub mod health;
pub mod meal;
pub mod reservation;
