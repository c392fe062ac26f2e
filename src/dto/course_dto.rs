use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::course::{Course, Module};
use crate::models::quiz::Quiz;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCoursePayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCoursePayload {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateModulePayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<Module>,
    pub quizzes: Vec<Quiz>,
}

/// Course list row. `enrolled` is only present for authenticated requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseListItem {
    #[serde(flatten)]
    pub course: Course,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProgressResponse {
    pub course_id: Uuid,
    pub enrolled: bool,
    pub total_modules: usize,
    pub completed_module_ids: Vec<Uuid>,
}

/// Informational reply for idempotent actions such as a repeated enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
        }
    }
}
