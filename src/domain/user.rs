//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Inactive users cannot log in; deleting a user only clears this flag
    pub is_active: bool,
    pub is_customer: bool,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user whose password was just set
    pub fn new(id: Uuid, username: String, password_hash: String, is_customer: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            password_hash,
            is_active: true,
            is_customer,
            password_changed_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fail with `InactiveUser` unless the account is active
    pub fn ensure_active(&self) -> crate::errors::AppResult<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(crate::errors::AppError::InactiveUser)
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "marta")]
    pub username: String,
    pub is_active: bool,
    pub is_customer: bool,
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_active: user.is_active,
            is_customer: user.is_customer,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_new_user_is_active() {
        let user = User::new(Uuid::new_v4(), "marta".into(), "hash".into(), true);

        assert!(user.is_active);
        assert!(user.is_customer);
        assert!(user.password_changed_at.is_some());
        assert!(user.ensure_active().is_ok());
    }

    #[test]
    fn test_inactive_user_is_rejected() {
        let mut user = User::new(Uuid::new_v4(), "marta".into(), "hash".into(), false);
        user.is_active = false;

        assert!(matches!(user.ensure_active(), Err(AppError::InactiveUser)));
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User::new(Uuid::new_v4(), "marta".into(), "secret-hash".into(), false);
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"username\":\"marta\""));
    }
}
