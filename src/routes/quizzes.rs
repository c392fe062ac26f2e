use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::quiz_dto::{CreateQuizPayload, QuizDetailResponse, UpdateQuizPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    services::import_service::parse_quiz_file,
    AppState,
};

#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.course_service.get_by_id(course_id).await?;
    let quizzes = state.quiz_service.list_for_course(course_id).await?;
    Ok(Json(quizzes))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/quizzes",
    params(
        ("id" = Uuid, Path, description = "Course ID")
    ),
    request_body = CreateQuizPayload,
    responses(
        (status = 201, description = "Quiz created"),
        (status = 403, description = "Requester does not own the course"),
        (status = 404, description = "Course not found")
    )
)]
#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let course = state
        .course_service
        .get_owned(course_id, claims.user_id()?)
        .await?;
    let quiz = state.quiz_service.create(course.id, payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let quiz = state.quiz_service.get_by_id(id).await?;
    let course = state.course_service.get_by_id(quiz.course_id).await?;
    let questions = state.quiz_service.questions_with_answers(id).await?;

    Ok(Json(QuizDetailResponse {
        quiz,
        question_count: questions.len(),
        questions: course.is_owned_by(user_id).then_some(questions),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/quizzes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    request_body = UpdateQuizPayload,
    responses(
        (status = 200, description = "Quiz updated"),
        (status = 403, description = "Requester does not own the course"),
        (status = 404, description = "Quiz not found")
    )
)]
#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state
        .quiz_service
        .update(id, claims.user_id()?, payload)
        .await?;
    Ok(Json(quiz))
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.quiz_service.delete(id, claims.user_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/import",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Questions replaced from the uploaded CSV"),
        (status = 400, description = "Missing or invalid quiz file"),
        (status = 403, description = "Requester does not own the course")
    )
)]
#[axum::debug_handler]
pub async fn import_questions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_owned(id, claims.user_id()?).await?;

    let mut file: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field.bytes().await.map_err(Error::Multipart)?;
            tracing::info!(quiz_id = %quiz.id, %filename, size = data.len(), "quiz file received");
            file = Some(data);
        }
    }

    let data = match file {
        Some(data) if !data.is_empty() => data,
        Some(_) => return Err(Error::BadRequest("The uploaded quiz file is empty".to_string())),
        None => return Err(Error::BadRequest("Please choose a quiz file to import".to_string())),
    };

    let groups = parse_quiz_file(&data[..])?;
    let summary = state.import_service.import_questions(quiz.id, &groups).await?;
    Ok(Json(summary))
}
