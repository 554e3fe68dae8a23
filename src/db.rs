use crate::database::memory_repository::InMemoryRepository;
use crate::models::health::StartedAt;
use rocket::fairing::AdHoc;

/// Manages a fresh, empty record store. Nothing survives a restart.
pub fn stage_store() -> AdHoc {
    AdHoc::on_ignite("In-memory store", |rocket| async move {
        tracing::info!("In-memory record store initialized");
        rocket.manage(InMemoryRepository::new()).manage(StartedAt::default())
    })
}
