//! Course repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::entities::course::{self, ActiveModel, Entity as CourseEntity};
use crate::domain::{Course, CourseDraft};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    /// All courses ordered by title
    async fn list(&self) -> AppResult<Vec<Course>>;

    async fn create(&self, course: Course) -> AppResult<Course>;

    /// Replace every editable field of an existing course
    async fn update(&self, id: Uuid, draft: CourseDraft) -> AppResult<Course>;

    /// Remove the course; classes and enrollments cascade
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed [`CourseRepository`]
pub struct CourseStore {
    db: DatabaseConnection,
}

impl CourseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Course::from))
    }

    async fn list(&self) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .order_by_asc(course::Column::Title)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn create(&self, course: Course) -> AppResult<Course> {
        let active_model = ActiveModel {
            id: Set(course.id),
            title: Set(course.title),
            description: Set(course.description),
            image_url: Set(course.image_url),
            is_active: Set(course.is_active),
            created_at: Set(course.created_at),
            updated_at: Set(course.updated_at),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn update(&self, id: Uuid, draft: CourseDraft) -> AppResult<Course> {
        let existing = CourseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(draft.title);
        active.description = Set(draft.description);
        active.image_url = Set(draft.image_url);
        active.is_active = Set(draft.is_active);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CourseEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
