use crate::models::meal::Meal;
use crate::models::reservation::Reservation;
use crate::models::user::User;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-local record collections. Lost on restart.
#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub meals: Vec<Meal>,
    pub reservations: Vec<Reservation>,
    last_id: u64,
}

impl Store {
    /// One counter shared by every entity: `user_1`, `meal_2`, `resv_3`, ...
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.last_id += 1;
        format!("{}_{}", prefix, self.last_id)
    }
}

/// Repository backed by the in-memory [`Store`].
///
/// Every operation takes the lock exactly once, so operations that read and
/// then write (reserving servings, swapping a reservation status, enforcing
/// email uniqueness) are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().await
    }
}
