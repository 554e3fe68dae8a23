use crate::config::{AuthConfig, Config};
use crate::database::memory_repository::InMemoryRepository;
use crate::error::app_error::AppError;
use crate::models::user::{User, UserRole};
use crate::service::auth::AuthService;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::{Deserialize, Serialize};

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub zip: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            zip: user.zip.clone(),
        }
    }
}

/// Why the `CurrentUser` guard refused a request; read back by the 401 catcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    Unavailable,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "Authorization token required",
            AuthFailure::InvalidToken => "Invalid or expired token",
            AuthFailure::Unavailable => "Internal server error",
        }
    }

    fn status(&self) -> Status {
        match self {
            AuthFailure::MissingToken | AuthFailure::InvalidToken => Status::Unauthorized,
            AuthFailure::Unavailable => Status::InternalServerError,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs an HS256 session token for `user`, valid for the configured lifetime.
pub fn issue_token(user: &User, config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user_id: user.id.clone(),
        email: user.email.clone(),
        iat: now,
        exp: now + config.token_ttl_seconds,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_bytes())).map_err(|e| AppError::token("Failed to sign session token", e))
}

/// Verifies signature and expiry. Any failure is `None`.
pub fn decode_token(token: &str, config: &AuthConfig) -> Option<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(config.jwt_secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .ok()
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub(crate) fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

fn refuse<S>(req: &Request<'_>, failure: AuthFailure) -> RequestOutcome<S, AuthFailure> {
    req.local_cache(|| Some(failure));
    Outcome::Error((failure.status(), failure))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AuthFailure;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = req.headers().get_one("Authorization").and_then(parse_bearer) else {
            return refuse(req, AuthFailure::MissingToken);
        };

        let (Some(repo), Some(config)) = (req.rocket().state::<InMemoryRepository>(), req.rocket().state::<Config>()) else {
            tracing::error!("record store or configuration not managed");
            return refuse(req, AuthFailure::Unavailable);
        };

        let service = AuthService::new(repo, &config.auth, &config.pilot);
        match service.user_from_token(token).await {
            Some(user) => {
                let current_user = CurrentUser::from(&user);
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            None => refuse(req, AuthFailure::InvalidToken),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Bearer token returned by POST /auth/register or POST /auth/login.".to_string()),
            data: SecuritySchemeData::Http {
                scheme: "bearer".to_string(),
                bearer_format: Some("JWT".to_string()),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("bearerAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("bearerAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}
