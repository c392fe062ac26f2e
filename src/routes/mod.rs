pub mod courses;
pub mod enrollment;
pub mod health;
pub mod quiz_session;
pub mod quizzes;
