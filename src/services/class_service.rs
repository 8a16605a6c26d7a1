//! Class service - Lessons inside the course catalog.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Class, ClassDraft};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ClassRepository, CourseRepository};

#[async_trait]
pub trait ClassService: Send + Sync {
    async fn get_class(&self, id: Uuid) -> AppResult<Class>;

    /// Classes of `course_id` in lesson order; the course must exist
    async fn list_classes(&self, course_id: Uuid) -> AppResult<Vec<Class>>;

    async fn create_class(&self, draft: ClassDraft) -> AppResult<Class>;

    async fn update_class(&self, id: Uuid, draft: ClassDraft) -> AppResult<Class>;

    async fn delete_class(&self, id: Uuid) -> AppResult<()>;
}

pub struct ClassCatalog {
    classes: Arc<dyn ClassRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl ClassCatalog {
    pub fn new(classes: Arc<dyn ClassRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { classes, courses }
    }

    async fn ensure_course(&self, course_id: Uuid) -> AppResult<()> {
        self.courses
            .find_by_id(course_id)
            .await?
            .ok_or_not_found()
            .map(|_| ())
    }
}

fn check_draft(draft: &ClassDraft) -> AppResult<()> {
    if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
        return Err(AppError::validation("Title and content are required"));
    }
    if draft.order < 1 {
        return Err(AppError::validation("Order must be at least 1"));
    }
    Ok(())
}

#[async_trait]
impl ClassService for ClassCatalog {
    async fn get_class(&self, id: Uuid) -> AppResult<Class> {
        self.classes.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_classes(&self, course_id: Uuid) -> AppResult<Vec<Class>> {
        self.ensure_course(course_id).await?;
        self.classes.list_by_course(course_id).await
    }

    async fn create_class(&self, draft: ClassDraft) -> AppResult<Class> {
        check_draft(&draft)?;
        self.ensure_course(draft.course_id).await?;

        let created = self
            .classes
            .create(Class::from_draft(Uuid::new_v4(), draft))
            .await?;

        tracing::info!(class_id = %created.id, course_id = %created.course_id, "Class created");
        Ok(created)
    }

    async fn update_class(&self, id: Uuid, draft: ClassDraft) -> AppResult<Class> {
        check_draft(&draft)?;
        self.ensure_course(draft.course_id).await?;
        self.classes.update(id, draft).await
    }

    async fn delete_class(&self, id: Uuid) -> AppResult<()> {
        self.classes.delete(id).await
    }
}
