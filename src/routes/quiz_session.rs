use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::course_dto::MessageResponse,
    dto::quiz_dto::{SubmitQuizRequest, SubmitQuizResponse, TakeQuizResponse},
    error::Result,
    middleware::auth::Claims,
    services::quiz_session_service::{SubmitOutcome, TakeQuiz},
    AppState,
};

pub fn result_path(quiz_id: Uuid) -> String {
    format!("/api/quizzes/{}/result", quiz_id)
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}/take",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Question form"),
        (status = 303, description = "Quiz already completed, see the result view"),
        (status = 403, description = "Student is not enrolled in the course")
    )
)]
#[axum::debug_handler]
pub async fn take_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    match state
        .quiz_session_service
        .take(claims.user_id()?, id)
        .await?
    {
        TakeQuiz::Form { quiz, questions } => Ok(Json(TakeQuizResponse {
            quiz_id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            questions: questions.into_iter().map(Into::into).collect(),
        })
        .into_response()),
        TakeQuiz::Completed(result) => Ok(Redirect::to(&result_path(result.quiz_id)).into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    request_body = SubmitQuizRequest,
    responses(
        (status = 201, description = "Submission graded and stored"),
        (status = 200, description = "Quiz was already completed; nothing stored"),
        (status = 403, description = "Student is not enrolled in the course")
    )
)]
#[axum::debug_handler]
pub async fn submit_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<Response> {
    let outcome = state
        .quiz_session_service
        .submit(claims.user_id()?, id, &req.answers)
        .await?;

    let response = match outcome {
        SubmitOutcome::Graded(result) => (
            StatusCode::CREATED,
            Json(SubmitQuizResponse {
                status: "graded".to_string(),
                message: "Quiz submitted".to_string(),
                result: result.into(),
            }),
        ),
        SubmitOutcome::AlreadyCompleted(result) => (
            StatusCode::OK,
            Json(SubmitQuizResponse {
                status: "already_completed".to_string(),
                message: "You have already completed this quiz. Restart it to try again."
                    .to_string(),
                result: result.into(),
            }),
        ),
    };
    Ok(response.into_response())
}

#[axum::debug_handler]
pub async fn restart_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let restarted = state
        .quiz_session_service
        .restart(claims.user_id()?, id)
        .await?;

    let message = if restarted {
        MessageResponse::new("restarted", "Your previous result was cleared")
    } else {
        MessageResponse::new("not_started", "There is no result to clear for this quiz")
    };
    Ok(Json(message))
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state
        .quiz_session_service
        .result_view(claims.user_id()?, id)
        .await?;
    Ok(Json(view))
}
