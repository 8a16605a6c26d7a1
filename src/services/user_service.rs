//! User service - Profile management for existing accounts.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
///
/// Every mutation requires the target user to exist and be active.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn update_user(
        &self,
        id: Uuid,
        username: Option<String>,
        is_customer: Option<bool>,
    ) -> AppResult<User>;

    /// Deactivate the user; the row is kept
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    async fn change_password(&self, id: Uuid, password: String) -> AppResult<User>;
}

/// Default [`UserService`] over a user repository
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    async fn active_user(&self, id: Uuid) -> AppResult<User> {
        let user = self.users.find_by_id(id).await?.ok_or_not_found()?;
        user.ensure_active()?;
        Ok(user)
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn update_user(
        &self,
        id: Uuid,
        username: Option<String>,
        is_customer: Option<bool>,
    ) -> AppResult<User> {
        let current = self.active_user(id).await?;

        let username = match username.map(|u| u.trim().to_string()) {
            Some(u) if u.is_empty() => return Err(AppError::validation("Username is required")),
            Some(u) if u != current.username => {
                if self.users.find_by_username(&u).await?.is_some() {
                    return Err(AppError::conflict("Username"));
                }
                Some(u)
            }
            _ => None,
        };

        self.users.update(id, username, is_customer).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.active_user(id).await?;
        self.users.deactivate(id).await?;

        tracing::info!(user_id = %id, "User deactivated");
        Ok(())
    }

    async fn change_password(&self, id: Uuid, password: String) -> AppResult<User> {
        self.active_user(id).await?;
        let password_hash = Password::new(&password)?.into_string();
        self.users.change_password(id, password_hash).await
    }
}
