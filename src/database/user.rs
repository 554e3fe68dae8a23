use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::models::user::{NewUser, User};
use chrono::Utc;

#[async_trait::async_trait]
pub trait UserRepository {
    /// Fails with [`AppError::EmailAlreadyRegistered`] if the email exists in any letter case.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
}

fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait::async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut store = self.write().await;
        if store.users.iter().any(|existing| same_email(&existing.email, &user.email)) {
            return Err(AppError::EmailAlreadyRegistered(user.email));
        }

        let now = Utc::now();
        let user = User {
            id: store.next_id("user"),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            zip: user.zip,
            created_at: now,
            updated_at: now,
        };
        store.users.push(user.clone());

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let store = self.read().await;
        Ok(store.users.iter().find(|user| same_email(&user.email, email)).cloned())
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let store = self.read().await;
        Ok(store.users.iter().find(|user| user.id == id).cloned())
    }
}
