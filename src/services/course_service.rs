//! Course catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, CourseDraft};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::CourseRepository;

#[async_trait]
pub trait CourseService: Send + Sync {
    async fn get_course(&self, id: Uuid) -> AppResult<Course>;

    async fn list_courses(&self) -> AppResult<Vec<Course>>;

    async fn create_course(&self, draft: CourseDraft) -> AppResult<Course>;

    async fn update_course(&self, id: Uuid, draft: CourseDraft) -> AppResult<Course>;

    async fn delete_course(&self, id: Uuid) -> AppResult<()>;
}

pub struct CourseCatalog {
    courses: Arc<dyn CourseRepository>,
}

impl CourseCatalog {
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }
}

fn check_draft(draft: &CourseDraft) -> AppResult<()> {
    if draft.title.trim().is_empty() || draft.description.trim().is_empty() {
        return Err(AppError::validation("Title and description are required"));
    }
    Ok(())
}

#[async_trait]
impl CourseService for CourseCatalog {
    async fn get_course(&self, id: Uuid) -> AppResult<Course> {
        self.courses.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.courses.list().await
    }

    async fn create_course(&self, draft: CourseDraft) -> AppResult<Course> {
        check_draft(&draft)?;
        let created = self
            .courses
            .create(Course::from_draft(Uuid::new_v4(), draft))
            .await?;

        tracing::info!(course_id = %created.id, "Course created");
        Ok(created)
    }

    async fn update_course(&self, id: Uuid, draft: CourseDraft) -> AppResult<Course> {
        check_draft(&draft)?;
        self.courses.update(id, draft).await
    }

    async fn delete_course(&self, id: Uuid) -> AppResult<()> {
        self.courses.delete(id).await
    }
}
