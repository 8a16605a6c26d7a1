//! Course catalog entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A course of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    #[schema(example = "3f2b8c1e-6f3a-4b8e-9a57-1d2f4c5e6a7b")]
    pub id: Uuid,
    #[schema(example = "Basic obedience")]
    pub title: String,
    pub description: String,
    #[schema(example = "https://cdn.example.com/courses/obedience.png")]
    pub image_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a client provides when creating or replacing a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub is_active: bool,
}

impl Course {
    pub fn from_draft(id: Uuid, draft: CourseDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}
