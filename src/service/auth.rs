use crate::auth::{decode_token, issue_token};
use crate::config::{AuthConfig, PilotConfig};
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserResponse, UserRole};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;
use tracing::{debug, info};
use validator::Validate;

/// A real Argon2 hash generated once, used as a timing decoy so that logins
/// for unknown emails cost the same as logins for existing ones.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("dummy-never-matches").ok());

pub struct AuthService<'a, R> {
    repository: &'a R,
    auth: &'a AuthConfig,
    pilot: &'a PilotConfig,
}

impl<'a, R: UserRepository> AuthService<'a, R> {
    pub fn new(repository: &'a R, auth: &'a AuthConfig, pilot: &'a PilotConfig) -> Self {
        AuthService { repository, auth, pilot }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        request.validate()?;

        if request.zip != self.pilot.zip {
            return Err(AppError::BadRequest(format!("For this pilot, only zip {} is supported", self.pilot.zip)));
        }

        if self.repository.get_user_by_email(&request.email).await?.is_some() {
            return Err(AppError::EmailAlreadyRegistered(request.email.clone()));
        }

        let role: UserRole = request
            .role
            .parse()
            .map_err(|_| AppError::BadRequest("role must be one of: cook, diner".to_string()))?;

        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::PasswordHash {
                message: format!("Hashing task failed: {}", e),
            })??;

        let user = self
            .repository
            .create_user(NewUser {
                name: request.name.clone(),
                email: request.email.clone(),
                password_hash,
                role,
                zip: request.zip.clone(),
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        self.session_for(&user)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AppError> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest("Email and password are required".to_string()));
        }

        let Some(user) = self.repository.get_user_by_email(&request.email).await? else {
            let password = request.password.clone();
            let _ = tokio::task::spawn_blocking(move || dummy_verify(&password)).await;
            debug!("login attempt for unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let stored_hash = user.password_hash.clone();
        let password = request.password.clone();
        tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
            .await
            .map_err(|e| AppError::PasswordHash {
                message: format!("Verification task failed: {}", e),
            })??;

        info!(user_id = %user.id, "user logged in");
        self.session_for(&user)
    }

    /// Resolves a session token to its user. Never fails: bad signatures,
    /// expired tokens and unknown ids all come back as `None`.
    pub async fn user_from_token(&self, token: &str) -> Option<User> {
        let claims = decode_token(token, self.auth)?;
        match self.repository.get_user_by_id(&claims.user_id).await {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "token user lookup failed");
                None
            }
        }
    }

    fn session_for(&self, user: &User) -> Result<AuthResponse, AppError> {
        Ok(AuthResponse {
            user: UserResponse::from(user),
            token: issue_token(user, self.auth)?,
        })
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(stored_hash: &str, password: &str) -> Result<(), AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::InvalidCredentials)
}

fn dummy_verify(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(hash, password);
    }
}
