use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

/// Dashboard row: an enrollment joined with its course title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentWithCourse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Progress {
    pub id: Uuid,
    pub student_id: Uuid,
    pub module_id: Uuid,
    pub completed_at: DateTime<Utc>,
}
