//! Audit records of authenticated requests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One handled request, as written to `action_logs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLog {
    pub id: Uuid,
    /// Caller, when the request carried a valid token
    pub user_id: Option<Uuid>,
    /// `"<METHOD> <path>"`
    pub action_type: String,
    /// Request body as JSON text with secrets removed
    pub metadata: String,
    pub timezone: String,
    pub performed_at: DateTime<Utc>,
}

impl ActionLog {
    pub fn new(
        user_id: Option<Uuid>,
        action_type: String,
        metadata: String,
        timezone: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action_type,
            metadata,
            timezone,
            performed_at: Utc::now(),
        }
    }
}
