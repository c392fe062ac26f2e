use crate::dto::course_dto::{CreateCoursePayload, CreateModulePayload, UpdateCoursePayload};
use crate::error::{Error, Result};
use crate::models::course::{Course, Module};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCoursePayload, owner_id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(payload.title.trim())
        .bind(payload.description.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(course_id = %course.id, %owner_id, "course created");
        Ok(course)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Course> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Course {} not found", id)))
    }

    pub async fn list(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    pub async fn list_owned_by(&self, owner_id: Uuid) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    /// Loads the course and fails with `Forbidden` unless `user_id` owns it.
    pub async fn get_owned(&self, id: Uuid, user_id: Uuid) -> Result<Course> {
        let course = self.get_by_id(id).await?;
        if !course.is_owned_by(user_id) {
            tracing::warn!(course_id = %id, %user_id, "rejected mutation by non-owner");
            return Err(Error::Forbidden(
                "Only the course owner can change this course".to_string(),
            ));
        }
        Ok(course)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        payload: UpdateCoursePayload,
    ) -> Result<Course> {
        self.get_owned(id, user_id).await?;

        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.title.as_deref().map(str::trim))
        .bind(payload.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    pub async fn list_modules(&self, course_id: Uuid) -> Result<Vec<Module>> {
        let modules = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE course_id = $1 ORDER BY created_at, id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(modules)
    }

    pub async fn get_module(&self, module_id: Uuid) -> Result<Module> {
        sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE id = $1")
            .bind(module_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Module {} not found", module_id)))
    }

    pub async fn add_module(
        &self,
        course_id: Uuid,
        user_id: Uuid,
        payload: CreateModulePayload,
    ) -> Result<Module> {
        self.get_owned(course_id, user_id).await?;

        let module = sqlx::query_as::<_, Module>(
            r#"
            INSERT INTO modules (course_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(course_id)
        .bind(payload.title.trim())
        .bind(payload.description.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn delete_module(&self, course_id: Uuid, module_id: Uuid, user_id: Uuid) -> Result<()> {
        self.get_owned(course_id, user_id).await?;

        let deleted = sqlx::query("DELETE FROM modules WHERE id = $1 AND course_id = $2")
            .bind(module_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(Error::NotFound(format!(
                "Module {} not found in course {}",
                module_id, course_id
            )));
        }
        Ok(())
    }
}
