//! Class repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::class::{self, ActiveModel, Entity as ClassEntity};
use crate::domain::{Class, ClassDraft};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Class>>;

    /// Classes of one course in lesson order
    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Class>>;

    async fn create(&self, class: Class) -> AppResult<Class>;

    /// Replace every editable field, including the owning course
    async fn update(&self, id: Uuid, draft: ClassDraft) -> AppResult<Class>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed [`ClassRepository`]
pub struct ClassStore {
    db: DatabaseConnection,
}

impl ClassStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClassRepository for ClassStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Class>> {
        let result = ClassEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Class::from))
    }

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Class>> {
        let models = ClassEntity::find()
            .filter(class::Column::CourseId.eq(course_id))
            .order_by_asc(class::Column::Position)
            .order_by_asc(class::Column::Title)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Class::from).collect())
    }

    async fn create(&self, class: Class) -> AppResult<Class> {
        let active_model = ActiveModel {
            id: Set(class.id),
            course_id: Set(class.course_id),
            title: Set(class.title),
            content: Set(class.content),
            video_url: Set(class.video_url),
            material_url: Set(class.material_url),
            position: Set(class.order),
            is_active: Set(class.is_active),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Class::from(model))
    }

    async fn update(&self, id: Uuid, draft: ClassDraft) -> AppResult<Class> {
        let existing = ClassEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.course_id = Set(draft.course_id);
        active.title = Set(draft.title);
        active.content = Set(draft.content);
        active.video_url = Set(draft.video_url);
        active.material_url = Set(draft.material_url);
        active.position = Set(draft.order);
        active.is_active = Set(draft.is_active);

        let model = active.update(&self.db).await?;
        Ok(Class::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ClassEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
