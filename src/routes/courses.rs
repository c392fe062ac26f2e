use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::course_dto::{
        CourseDetailResponse, CourseListItem, CreateCoursePayload, CreateModulePayload,
        UpdateCoursePayload,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn list_courses(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<impl IntoResponse> {
    let courses = state.course_service.list().await?;

    let enrolled_ids = match claims {
        Some(Extension(claims)) => Some(
            state
                .enrollment_service
                .enrolled_course_ids(claims.user_id()?)
                .await?,
        ),
        None => None,
    };

    let items: Vec<CourseListItem> = courses
        .into_iter()
        .map(|course| CourseListItem {
            enrolled: enrolled_ids.as_ref().map(|ids| ids.contains(&course.id)),
            course,
        })
        .collect();
    Ok(Json(items))
}

#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let course = state.course_service.get_by_id(id).await?;
    let modules = state.course_service.list_modules(id).await?;
    let quizzes = state.quiz_service.list_for_course(id).await?;
    Ok(Json(CourseDetailResponse {
        course,
        modules,
        quizzes,
    }))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Course created, requester is the owner"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state
        .course_service
        .create(payload, claims.user_id()?)
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    patch,
    path = "/api/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = UpdateCoursePayload,
    responses(
        (status = 200, description = "Course updated"),
        (status = 403, description = "Requester does not own the course"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoursePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state
        .course_service
        .update(id, claims.user_id()?, payload)
        .await?;
    Ok(Json(course))
}

#[axum::debug_handler]
pub async fn my_courses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let courses = state
        .course_service
        .list_owned_by(claims.user_id()?)
        .await?;
    Ok(Json(courses))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/modules",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = CreateModulePayload,
    responses(
        (status = 201, description = "Module added"),
        (status = 403, description = "Requester does not own the course")
    )
)]
#[axum::debug_handler]
pub async fn add_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateModulePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let module = state
        .course_service
        .add_module(id, claims.user_id()?, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[axum::debug_handler]
pub async fn delete_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_id, module_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state
        .course_service
        .delete_module(course_id, module_id, claims.user_id()?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
