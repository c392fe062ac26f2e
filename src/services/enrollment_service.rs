use crate::error::Result;
use crate::models::course::Module;
use crate::models::enrollment::{Enrollment, EnrollmentWithCourse, Progress};
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

/// Outcome of an idempotent insert guarded by a unique constraint.
#[derive(Debug, Clone)]
pub enum Recorded<T> {
    Created(T),
    AlreadyExists(T),
}

impl<T> Recorded<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Recorded::Created(_))
    }
}

#[derive(Clone)]
pub struct EnrollmentService {
    pool: PgPool,
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> Result<Recorded<Enrollment>> {
        let inserted = sqlx::query_as::<_, Enrollment>(
            r#"
            INSERT INTO enrollments (student_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (student_id, course_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(enrollment) = inserted {
            tracing::info!(%student_id, %course_id, "student enrolled");
            return Ok(Recorded::Created(enrollment));
        }

        let existing = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Recorded::AlreadyExists(existing))
    }

    pub async fn is_enrolled(&self, student_id: Uuid, course_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn enrolled_course_ids(&self, student_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT course_id FROM enrollments WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().collect())
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<EnrollmentWithCourse>> {
        let rows = sqlx::query_as::<_, EnrollmentWithCourse>(
            r#"
            SELECT e.id, e.course_id, c.title AS course_title, e.enrolled_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.student_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_module_complete(
        &self,
        student_id: Uuid,
        module: &Module,
    ) -> Result<Recorded<Progress>> {
        let inserted = sqlx::query_as::<_, Progress>(
            r#"
            INSERT INTO progress (student_id, module_id)
            VALUES ($1, $2)
            ON CONFLICT (student_id, module_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(module.id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(progress) = inserted {
            tracing::info!(%student_id, module_id = %module.id, "module completed");
            return Ok(Recorded::Created(progress));
        }

        let existing = sqlx::query_as::<_, Progress>(
            "SELECT * FROM progress WHERE student_id = $1 AND module_id = $2",
        )
        .bind(student_id)
        .bind(module.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Recorded::AlreadyExists(existing))
    }

    pub async fn completed_module_ids(&self, student_id: Uuid, course_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT p.module_id
            FROM progress p
            JOIN modules m ON m.id = p.module_id
            WHERE p.student_id = $1 AND m.course_id = $2
            ORDER BY p.completed_at
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
