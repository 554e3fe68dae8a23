pub mod access;
pub mod auth;
pub mod meal;
pub mod reservation;
