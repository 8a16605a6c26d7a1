//! Authentication service - Registration, login and token verification.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, MIN_USERNAME_LENGTH};
use crate::domain::{Password, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new active user
    async fn register(&self, username: String, password: String, is_customer: bool)
        -> AppResult<User>;

    /// Check credentials and issue a token
    async fn login(&self, username: String, password: String) -> AppResult<LoginResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// A real hash to verify against when the username is unknown, so both
/// paths cost one Argon2 verification.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        Password::new("timing-equalizer-password")
            .map(Password::into_string)
            .unwrap_or_default()
    })
}

/// Default [`AuthService`] over a user repository
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    config: Config,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, config: Config) -> Self {
        Self { users, config }
    }

    fn issue_token(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        Ok((token, expires_at))
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(
        &self,
        username: String,
        password: String,
        is_customer: bool,
    ) -> AppResult<User> {
        let username = username.trim().to_string();
        if username.chars().count() < MIN_USERNAME_LENGTH as usize {
            return Err(AppError::validation(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LENGTH
            )));
        }

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::conflict("Username"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = User::new(Uuid::new_v4(), username, password_hash, is_customer);
        let created = self.users.create(user).await?;

        tracing::info!(user_id = %created.id, "User registered");
        Ok(created)
    }

    async fn login(&self, username: String, password: String) -> AppResult<LoginResponse> {
        let found = self.users.find_by_username(&username).await?;

        let stored_hash = found
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or_else(|| dummy_hash());
        let password_valid = Password::from_hash(stored_hash.to_string()).verify(&password);

        let user = match found {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };
        user.ensure_active()?;

        let (token, expires_at) = self.issue_token(&user)?;
        Ok(LoginResponse {
            user: UserResponse::from(user),
            token,
            expires_at,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
