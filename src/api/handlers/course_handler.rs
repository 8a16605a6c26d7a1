//! Course catalog handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Course, CourseDraft};
use crate::errors::AppResult;

fn default_active() -> bool {
    true
}

/// Course fields for create and full update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CourseRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    #[schema(example = "Basic obedience")]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    #[schema(example = "Six weeks of positive-reinforcement training.")]
    pub description: String,
    #[validate(url(message = "Image URL must be a valid URL"))]
    #[schema(example = "https://cdn.example.com/courses/obedience.png")]
    pub image_url: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl From<CourseRequest> for CourseDraft {
    fn from(req: CourseRequest) -> Self {
        CourseDraft {
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            is_active: req.is_active,
        }
    }
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:id", get(get_course).put(update_course).delete(delete_course))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All courses", body = Vec<Course>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_courses(State(state): State<AppState>) -> AppResult<Json<Vec<Course>>> {
    Ok(Json(state.course_service.list_courses().await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Course>> {
    Ok(Json(state.course_service.get_course(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CourseRequest>,
) -> AppResult<(StatusCode, Json<Course>)> {
    let course = state.course_service.create_course(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CourseRequest>,
) -> AppResult<Json<Course>> {
    Ok(Json(state.course_service.update_course(id, payload.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.course_service.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
