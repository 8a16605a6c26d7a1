//! User repository.
//!
//! Users are never removed: deletion clears `is_active` so the username stays
//! reserved and foreign keys from customers and enrollments stay valid.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID, active or not
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by exact username, active or not
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a new user
    async fn create(&self, user: User) -> AppResult<User>;

    /// Update profile fields; `None` leaves a field untouched
    async fn update(
        &self,
        id: Uuid,
        username: Option<String>,
        is_customer: Option<bool>,
    ) -> AppResult<User>;

    /// Mark the user inactive
    async fn deactivate(&self, id: Uuid) -> AppResult<()>;

    /// Replace the password hash and stamp `password_changed_at`
    async fn change_password(&self, id: Uuid, password_hash: String) -> AppResult<User>;

    /// All users ordered by username
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// SeaORM-backed [`UserRepository`]
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

/// Username uniqueness is enforced by the table; surface it as a conflict.
fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Username"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, user: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(user.id),
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            is_active: Set(user.is_active),
            is_customer: Set(user.is_customer),
            password_changed_at: Set(user.password_changed_at),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };

        let model = active_model.insert(&self.db).await.map_err(map_write_error)?;
        Ok(User::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        username: Option<String>,
        is_customer: Option<bool>,
    ) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(username) = username {
            active.username = Set(username);
        }
        if let Some(is_customer) = is_customer {
            active.is_customer = Set(is_customer);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(map_write_error)?;
        Ok(User::from(model))
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }

    async fn change_password(&self, id: Uuid, password_hash: String) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        let now = Utc::now();
        active.password_hash = Set(password_hash);
        active.password_changed_at = Set(Some(now));
        active.updated_at = Set(now);

        let model = active.update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
