//! Action log service - Audit trail writes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ActionLog;
use crate::errors::AppResult;
use crate::infra::ActionLogRepository;

#[async_trait]
pub trait ActionLogService: Send + Sync {
    async fn record(&self, entry: ActionLog) -> AppResult<()>;
}

pub struct ActionLogger {
    logs: Arc<dyn ActionLogRepository>,
}

impl ActionLogger {
    pub fn new(logs: Arc<dyn ActionLogRepository>) -> Self {
        Self { logs }
    }
}

#[async_trait]
impl ActionLogService for ActionLogger {
    async fn record(&self, entry: ActionLog) -> AppResult<()> {
        tracing::debug!(action = %entry.action_type, user_id = ?entry.user_id, "Recording action");
        self.logs.record(entry).await
    }
}
