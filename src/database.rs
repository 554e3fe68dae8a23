pub mod meal;
pub mod memory_repository;
pub mod reservation;
pub mod user;
