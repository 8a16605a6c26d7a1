//! Action log repository. Append-only.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use super::entities::action_log::ActiveModel;
use crate::domain::ActionLog;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ActionLogRepository: Send + Sync {
    async fn record(&self, entry: ActionLog) -> AppResult<()>;
}

/// SeaORM-backed [`ActionLogRepository`]
pub struct ActionLogStore {
    db: DatabaseConnection,
}

impl ActionLogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActionLogRepository for ActionLogStore {
    async fn record(&self, entry: ActionLog) -> AppResult<()> {
        ActiveModel {
            id: Set(entry.id),
            user_id: Set(entry.user_id),
            action_type: Set(entry.action_type),
            metadata: Set(entry.metadata),
            timezone: Set(entry.timezone),
            performed_at: Set(entry.performed_at),
        }
        .insert(&self.db)
        .await?;

        Ok(())
    }
}
