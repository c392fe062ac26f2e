use crate::dto::quiz_dto::{AttemptView, ResultView};
use crate::error::{Error, Result};
use crate::models::attempt::QuizResult;
use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::services::enrollment_service::EnrollmentService;
use crate::services::grading_service::GradingService;
use crate::services::quiz_service::QuizService;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// What a student sees when opening a quiz.
#[derive(Debug)]
pub enum TakeQuiz {
    /// No result yet: answer the questions.
    Form { quiz: Quiz, questions: Vec<Question> },
    /// Already submitted; only the result is viewable until a restart.
    Completed(QuizResult),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Graded(QuizResult),
    AlreadyCompleted(QuizResult),
}

#[derive(Clone)]
pub struct QuizSessionService {
    pool: PgPool,
    quizzes: QuizService,
    enrollments: EnrollmentService,
}

impl QuizSessionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            quizzes: QuizService::new(pool.clone()),
            enrollments: EnrollmentService::new(pool.clone()),
            pool,
        }
    }

    async fn ensure_enrolled(&self, student_id: Uuid, quiz: &Quiz) -> Result<()> {
        if self.enrollments.is_enrolled(student_id, quiz.course_id).await? {
            Ok(())
        } else {
            Err(Error::Forbidden(
                "Enroll in the course before taking its quizzes".to_string(),
            ))
        }
    }

    pub async fn find_result(&self, student_id: Uuid, quiz_id: Uuid) -> Result<Option<QuizResult>> {
        let result = sqlx::query_as::<_, QuizResult>(
            "SELECT * FROM quiz_results WHERE student_id = $1 AND quiz_id = $2",
        )
        .bind(student_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(result)
    }

    pub async fn take(&self, student_id: Uuid, quiz_id: Uuid) -> Result<TakeQuiz> {
        let quiz = self.quizzes.get_by_id(quiz_id).await?;
        self.ensure_enrolled(student_id, &quiz).await?;

        if let Some(result) = self.find_result(student_id, quiz_id).await? {
            return Ok(TakeQuiz::Completed(result));
        }

        let questions = self
            .quizzes
            .questions_with_answers(quiz_id)
            .await?
            .into_iter()
            .map(|q| q.question)
            .collect();
        Ok(TakeQuiz::Form { quiz, questions })
    }

    /// Grades a submission and stores one attempt per question plus the
    /// result, all in one transaction. A student who already has a result
    /// gets it back unchanged.
    pub async fn submit(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
        answers: &HashMap<Uuid, String>,
    ) -> Result<SubmitOutcome> {
        let quiz = self.quizzes.get_by_id(quiz_id).await?;
        self.ensure_enrolled(student_id, &quiz).await?;

        if answers.values().any(|text| text.contains('\0')) {
            return Err(Error::BadRequest(
                "Answers must not contain NUL characters".to_string(),
            ));
        }

        let questions = self.quizzes.questions_with_answers(quiz_id).await?;
        let unknown = answers
            .keys()
            .filter(|id| !questions.iter().any(|q| q.question.id == **id))
            .count();
        if unknown > 0 {
            tracing::debug!(%quiz_id, unknown, "ignoring answers for questions not in quiz");
        }

        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO quiz_results (student_id, quiz_id)
            VALUES ($1, $2)
            ON CONFLICT (student_id, quiz_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(quiz_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(result) = claimed else {
            tx.rollback().await?;
            tracing::info!(%student_id, %quiz_id, "submission ignored, quiz already completed");
            let existing = self
                .find_result(student_id, quiz_id)
                .await?
                .ok_or_else(|| Error::Internal("Quiz result vanished during submission".to_string()))?;
            return Ok(SubmitOutcome::AlreadyCompleted(existing));
        };

        let graded = GradingService::grade_submission(&questions, answers);

        for answer in &graded.answers {
            sqlx::query(
                r#"
                INSERT INTO attempts (
                    student_id, question_id, result_id, question_text, question_position,
                    reference_text, submitted_text, match_score, is_correct
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(student_id)
            .bind(answer.question_id)
            .bind(result.id)
            .bind(&answer.question_text)
            .bind(answer.question_position)
            .bind(&answer.reference_text)
            .bind(&answer.submitted_text)
            .bind(answer.match_score)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            UPDATE quiz_results
            SET score = $2, correct_count = $3, question_count = $4, completed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(result.id)
        .bind(graded.score)
        .bind(graded.correct_count)
        .bind(graded.question_count)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            %student_id,
            %quiz_id,
            score = %result.score,
            correct = result.correct_count,
            total = result.question_count,
            "quiz graded"
        );
        Ok(SubmitOutcome::Graded(result))
    }

    /// Deletes the student's result so the quiz can be taken again. Earlier
    /// attempts are kept with their result link cleared. Returns whether a
    /// result existed.
    pub async fn restart(&self, student_id: Uuid, quiz_id: Uuid) -> Result<bool> {
        self.quizzes.get_by_id(quiz_id).await?;

        let deleted = sqlx::query("DELETE FROM quiz_results WHERE student_id = $1 AND quiz_id = $2")
            .bind(student_id)
            .bind(quiz_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            tracing::info!(%student_id, %quiz_id, "quiz restarted");
        }
        Ok(deleted > 0)
    }

    pub async fn result_view(&self, student_id: Uuid, quiz_id: Uuid) -> Result<ResultView> {
        let quiz = self.quizzes.get_by_id(quiz_id).await?;
        let result = self
            .find_result(student_id, quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound("You have not completed this quiz yet".to_string()))?;

        let attempts = sqlx::query_as::<_, AttemptView>(
            r#"
            SELECT
                id AS attempt_id,
                question_id,
                question_text,
                submitted_text,
                match_score,
                is_correct,
                reference_text AS correct_answer
            FROM attempts
            WHERE result_id = $1
            ORDER BY question_position, id
            "#,
        )
        .bind(result.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ResultView {
            quiz_title: quiz.title,
            result: result.into(),
            attempts,
        })
    }
}
