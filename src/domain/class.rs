//! Classes: the ordered lessons of a course.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Class {
    pub id: Uuid,
    pub course_id: Uuid,
    #[schema(example = "Sit and stay")]
    pub title: String,
    pub content: String,
    #[schema(example = "https://cdn.example.com/videos/sit.mp4")]
    pub video_url: String,
    #[schema(example = "https://cdn.example.com/materials/sit.pdf")]
    pub material_url: String,
    /// Position inside the course, starting at 1
    #[schema(example = 1)]
    pub order: i32,
    pub is_active: bool,
}

/// Fields a client provides when creating or replacing a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDraft {
    pub course_id: Uuid,
    pub title: String,
    pub content: String,
    pub video_url: String,
    pub material_url: String,
    pub order: i32,
    pub is_active: bool,
}

impl Class {
    pub fn from_draft(id: Uuid, draft: ClassDraft) -> Self {
        Self {
            id,
            course_id: draft.course_id,
            title: draft.title,
            content: draft.content,
            video_url: draft.video_url,
            material_url: draft.material_url,
            order: draft.order,
            is_active: draft.is_active,
        }
    }
}
