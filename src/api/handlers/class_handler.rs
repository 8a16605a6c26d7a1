//! Class handlers, mounted next to the course routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Class, ClassDraft};
use crate::errors::AppResult;

fn default_active() -> bool {
    true
}

/// Class fields for create and full update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClassRequest {
    pub course_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    #[schema(example = "Sit and stay")]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(url(message = "Video URL must be a valid URL"))]
    #[schema(example = "https://cdn.example.com/videos/sit.mp4")]
    pub video_url: String,
    #[validate(url(message = "Material URL must be a valid URL"))]
    #[schema(example = "https://cdn.example.com/materials/sit.pdf")]
    pub material_url: String,
    #[validate(range(min = 1, message = "Order must be at least 1"))]
    #[schema(example = 1, minimum = 1)]
    pub order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl From<ClassRequest> for ClassDraft {
    fn from(req: ClassRequest) -> Self {
        ClassDraft {
            course_id: req.course_id,
            title: req.title,
            content: req.content,
            video_url: req.video_url,
            material_url: req.material_url,
            order: req.order,
            is_active: req.is_active,
        }
    }
}

/// Routes relative to the course router; the static `classes` segment wins
/// over the course `/:id` route.
pub fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/classes", post(create_class))
        .route(
            "/classes/:id",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/classes/bycourse/:course_id", get(list_course_classes))
}

#[utoipa::path(
    get,
    path = "/api/courses/classes/bycourse/{course_id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Classes of the course in order", body = Vec<Class>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn list_course_classes(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> AppResult<Json<Vec<Class>>> {
    Ok(Json(state.class_service.list_classes(course_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/classes/{id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class", body = Class),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Class>> {
    Ok(Json(state.class_service.get_class(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/courses/classes",
    tag = "Classes",
    security(("bearer_auth" = [])),
    request_body = ClassRequest,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ClassRequest>,
) -> AppResult<(StatusCode, Json<Class>)> {
    let class = state.class_service.create_class(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    put,
    path = "/api/courses/classes/{id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = ClassRequest,
    responses(
        (status = 200, description = "Class updated", body = Class),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class or course not found")
    )
)]
pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ClassRequest>,
) -> AppResult<Json<Class>> {
    Ok(Json(state.class_service.update_class(id, payload.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/courses/classes/{id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.class_service.delete_class(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
