//! Class database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Class;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "classes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub video_url: String,
    #[sea_orm(column_type = "Text")]
    pub material_url: String,
    #[sea_orm(column_name = "order")]
    pub position: i32,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Class {
    fn from(model: Model) -> Self {
        Class {
            id: model.id,
            course_id: model.course_id,
            title: model.title,
            content: model.content,
            video_url: model.video_url,
            material_url: model.material_url,
            order: model.position,
            is_active: model.is_active,
        }
    }
}
