use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub id: Uuid,
    pub student_id: Uuid,
    /// `None` once the question was replaced by a re-import.
    pub question_id: Option<Uuid>,
    /// `None` once the owning result was deleted by a restart.
    pub result_id: Option<Uuid>,
    pub question_text: String,
    pub question_position: i32,
    /// Correct answer at grading time, if the question had one.
    pub reference_text: Option<String>,
    pub submitted_text: String,
    pub match_score: f64,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: Uuid,
    pub student_id: Uuid,
    pub quiz_id: Uuid,
    pub score: Decimal,
    pub correct_count: i32,
    pub question_count: i32,
    pub completed_at: DateTime<Utc>,
}
