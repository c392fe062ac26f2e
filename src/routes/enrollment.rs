use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::course_dto::{CourseProgressResponse, MessageResponse},
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[axum::debug_handler]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student_id = claims.user_id()?;
    let course = state.course_service.get_by_id(course_id).await?;
    let recorded = state.enrollment_service.enroll(student_id, course.id).await?;

    let response = if recorded.is_created() {
        (
            StatusCode::CREATED,
            Json(MessageResponse::new(
                "enrolled",
                format!("You are now enrolled in \"{}\"", course.title),
            )),
        )
    } else {
        (
            StatusCode::OK,
            Json(MessageResponse::new(
                "already_enrolled",
                format!("You are already enrolled in \"{}\"", course.title),
            )),
        )
    };
    Ok(response)
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let enrollments = state
        .enrollment_service
        .list_for_student(claims.user_id()?)
        .await?;
    Ok(Json(enrollments))
}

#[axum::debug_handler]
pub async fn course_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student_id = claims.user_id()?;
    state.course_service.get_by_id(course_id).await?;
    let modules = state.course_service.list_modules(course_id).await?;
    let enrolled = state
        .enrollment_service
        .is_enrolled(student_id, course_id)
        .await?;
    let completed_module_ids = state
        .enrollment_service
        .completed_module_ids(student_id, course_id)
        .await?;

    Ok(Json(CourseProgressResponse {
        course_id,
        enrolled,
        total_modules: modules.len(),
        completed_module_ids,
    }))
}

#[axum::debug_handler]
pub async fn complete_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(module_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let student_id = claims.user_id()?;
    let module = state.course_service.get_module(module_id).await?;
    let recorded = state
        .enrollment_service
        .mark_module_complete(student_id, &module)
        .await?;

    let status = if recorded.is_created() {
        "completed"
    } else {
        "already_completed"
    };
    Ok(Json(MessageResponse::new(
        status,
        format!("Module \"{}\" completed", module.title),
    )))
}
