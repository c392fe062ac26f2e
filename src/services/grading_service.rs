use crate::models::question::QuestionWithAnswers;
use crate::utils::text::{normalize, token_set_ratio};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use uuid::Uuid;

/// Match score at or above which a free-text answer counts as correct.
pub const MATCH_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_position: i32,
    pub reference_text: Option<String>,
    pub submitted_text: String,
    pub match_score: f64,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub answers: Vec<GradedAnswer>,
    pub correct_count: i32,
    pub question_count: i32,
    pub score: Decimal,
}

pub struct GradingService;

impl GradingService {
    /// Similarity between a submitted answer and the reference answer, in `[0, 1]`.
    pub fn match_score(submitted: &str, reference: &str) -> f64 {
        token_set_ratio(&normalize(submitted), &normalize(reference))
    }

    pub fn is_correct(score: f64) -> bool {
        score >= MATCH_THRESHOLD
    }

    /// Grades one submission. Questions without an entry in `answers` are
    /// graded as an empty answer; a question with no correct answer scores 0.
    pub fn grade_submission(
        questions: &[QuestionWithAnswers],
        answers: &HashMap<Uuid, String>,
    ) -> GradedSubmission {
        let mut graded = Vec::with_capacity(questions.len());
        let mut correct_count: i32 = 0;

        for q in questions {
            let submitted = answers
                .get(&q.question.id)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            let reference = q.correct_answer();
            let match_score = match reference {
                Some(reference) => Self::match_score(&submitted, &reference.text),
                None => 0.0,
            };
            let is_correct = Self::is_correct(match_score);
            if is_correct {
                correct_count += 1;
            }

            graded.push(GradedAnswer {
                question_id: q.question.id,
                question_text: q.question.text.clone(),
                question_position: q.question.position,
                reference_text: reference.map(|a| a.text.clone()),
                submitted_text: submitted,
                match_score,
                is_correct,
            });
        }

        let question_count = questions.len() as i32;
        GradedSubmission {
            answers: graded,
            correct_count,
            question_count,
            score: Self::percentage(correct_count, question_count),
        }
    }

    /// `correct / total * 100` rounded to two decimals; 0 for an empty quiz.
    pub fn percentage(correct: i32, total: i32) -> Decimal {
        if total <= 0 {
            return Decimal::ZERO;
        }
        let raw = Decimal::from(correct) * Decimal::ONE_HUNDRED / Decimal::from(total);
        raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn percentage_f64(score: Decimal) -> f64 {
        score.to_f64().unwrap_or_default()
    }
}
