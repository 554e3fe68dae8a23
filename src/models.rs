pub mod health;
pub mod meal;
pub mod reservation;
pub mod user;
