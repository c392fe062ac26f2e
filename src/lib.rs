pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    course_service::CourseService, enrollment_service::EnrollmentService,
    import_service::ImportService, quiz_service::QuizService,
    quiz_session_service::QuizSessionService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub course_service: CourseService,
    pub enrollment_service: EnrollmentService,
    pub quiz_service: QuizService,
    pub import_service: ImportService,
    pub quiz_session_service: QuizSessionService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            course_service: CourseService::new(pool.clone()),
            enrollment_service: EnrollmentService::new(pool.clone()),
            quiz_service: QuizService::new(pool.clone()),
            import_service: ImportService::new(pool.clone()),
            quiz_session_service: QuizSessionService::new(pool.clone()),
            pool,
        }
    }
}
