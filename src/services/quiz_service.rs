use crate::dto::quiz_dto::{CreateQuizPayload, UpdateQuizPayload};
use crate::error::{Error, Result};
use crate::models::question::{Answer, Question, QuestionWithAnswers};
use crate::models::quiz::Quiz;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, course_id: Uuid, payload: CreateQuizPayload) -> Result<Quiz> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (course_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(course_id)
        .bind(payload.title.trim())
        .bind(payload.description.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(quiz_id = %quiz.id, %course_id, "quiz created");
        Ok(quiz)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Quiz> {
        sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", id)))
    }

    pub async fn list_for_course(&self, course_id: Uuid) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            "SELECT * FROM quizzes WHERE course_id = $1 ORDER BY created_at, id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(quizzes)
    }

    /// Loads the quiz and fails with `Forbidden` unless `user_id` owns its course.
    pub async fn get_owned(&self, id: Uuid, user_id: Uuid) -> Result<Quiz> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT c.owner_id
            FROM quizzes q
            JOIN courses c ON c.id = q.course_id
            WHERE q.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Err(Error::NotFound(format!("Quiz {} not found", id))),
            Some((owner_id,)) if owner_id != user_id => {
                tracing::warn!(quiz_id = %id, %user_id, "rejected quiz mutation by non-owner");
                Err(Error::Forbidden(
                    "Only the course owner can change this quiz".to_string(),
                ))
            }
            Some(_) => self.get_by_id(id).await,
        }
    }

    pub async fn update(&self, id: Uuid, user_id: Uuid, payload: UpdateQuizPayload) -> Result<Quiz> {
        self.get_owned(id, user_id).await?;

        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
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

        Ok(quiz)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        self.get_owned(id, user_id).await?;

        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!(quiz_id = %id, %user_id, "quiz deleted");
        Ok(())
    }

    pub async fn questions_with_answers(&self, quiz_id: Uuid) -> Result<Vec<QuestionWithAnswers>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE quiz_id = $1 ORDER BY position, id",
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT a.*
            FROM answers a
            JOIN questions q ON q.id = a.question_id
            WHERE q.quiz_id = $1
            ORDER BY a.position, a.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<Uuid, Vec<Answer>> = HashMap::new();
        for answer in answers {
            by_question.entry(answer.question_id).or_default().push(answer);
        }

        Ok(questions
            .into_iter()
            .map(|question| QuestionWithAnswers {
                answers: by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect())
    }
}
