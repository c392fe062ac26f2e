use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::attempt::QuizResult;
use crate::models::question::Question;
use crate::services::grading_service::GradingService;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuizPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuizPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A question as shown on the take-quiz form; answer options stay hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionForm {
    pub id: Uuid,
    pub text: String,
    pub position: i32,
}

impl From<Question> for QuestionForm {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            position: q.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeQuizResponse {
    pub quiz_id: Uuid,
    pub title: String,
    pub description: String,
    pub questions: Vec<QuestionForm>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubmitQuizRequest {
    /// Free-text answers keyed by question id.
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub result_id: Uuid,
    pub quiz_id: Uuid,
    pub score: f64,
    pub correct_count: i32,
    pub question_count: i32,
    pub completed_at: DateTime<Utc>,
}

impl From<QuizResult> for ResultSummary {
    fn from(r: QuizResult) -> Self {
        Self {
            result_id: r.id,
            quiz_id: r.quiz_id,
            score: GradingService::percentage_f64(r.score),
            correct_count: r.correct_count,
            question_count: r.question_count,
            completed_at: r.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub status: String,
    pub message: String,
    pub result: ResultSummary,
}

/// An attempt with the question text and reference answer it was graded
/// against. `question_id` is `None` when the quiz was re-imported since.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptView {
    pub attempt_id: Uuid,
    pub question_id: Option<Uuid>,
    pub question_text: String,
    pub submitted_text: String,
    pub match_score: f64,
    pub is_correct: bool,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultView {
    pub quiz_title: String,
    pub result: ResultSummary,
    pub attempts: Vec<AttemptView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetailResponse {
    #[serde(flatten)]
    pub quiz: crate::models::quiz::Quiz,
    pub question_count: usize,
    /// Present only for the course owner, who may see the answer key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<crate::models::question::QuestionWithAnswers>>,
}
