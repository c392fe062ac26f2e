pub mod course_service;
pub mod enrollment_service;
pub mod grading_service;
pub mod import_service;
pub mod quiz_service;
pub mod quiz_session_service;
