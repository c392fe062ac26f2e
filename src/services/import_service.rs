use crate::error::{Error, Result};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::io::Read;
use uuid::Uuid;

const QUESTION_COLUMN: &str = "question";
const ANSWER_COLUMN: &str = "answer";
const IS_CORRECT_COLUMN: &str = "is_correct";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedAnswer {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedQuestion {
    pub text: String,
    pub answers: Vec<ImportedAnswer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub quiz_id: Uuid,
    pub questions_imported: usize,
    pub answers_imported: usize,
}

/// Reads a quiz CSV with `question`, `answer` and `is_correct` columns and
/// groups answer rows under their question, keeping first-seen order.
///
/// Rows with an empty question or answer are skipped. `is_correct` is true
/// only for the literal `true`, compared case-insensitively.
pub fn parse_quiz_file<R: Read>(reader: R) -> Result<Vec<ImportedQuestion>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::BadRequest(format!("Quiz file is missing the `{}` column", name)))
    };
    let question_idx = column(QUESTION_COLUMN)?;
    let answer_idx = column(ANSWER_COLUMN)?;
    let is_correct_idx = column(IS_CORRECT_COLUMN)?;

    let mut groups: Vec<ImportedQuestion> = Vec::new();
    let mut index_by_text: HashMap<String, usize> = HashMap::new();

    for record in csv_reader.records() {
        let record = record?;
        let question = record.get(question_idx).unwrap_or("").trim();
        let answer = record.get(answer_idx).unwrap_or("").trim();
        if question.is_empty() || answer.is_empty() {
            continue;
        }
        if question.contains('\0') || answer.contains('\0') {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(Error::BadRequest(format!(
                "Quiz file line {} contains a NUL character",
                line
            )));
        }
        let is_correct = record
            .get(is_correct_idx)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let idx = *index_by_text
            .entry(question.to_string())
            .or_insert_with(|| {
                groups.push(ImportedQuestion {
                    text: question.to_string(),
                    answers: Vec::new(),
                });
                groups.len() - 1
            });
        groups[idx].answers.push(ImportedAnswer {
            text: answer.to_string(),
            is_correct,
        });
    }

    Ok(groups)
}

/// Rejects imports that would leave grading ill-defined: no questions at all,
/// or a question with more than one correct answer.
pub fn validate_groups(groups: &[ImportedQuestion]) -> Result<()> {
    if groups.is_empty() {
        return Err(Error::BadRequest(
            "Quiz file contains no questions with answers".to_string(),
        ));
    }
    for group in groups {
        let correct = group.answers.iter().filter(|a| a.is_correct).count();
        if correct > 1 {
            return Err(Error::BadRequest(format!(
                "Question \"{}\" has {} correct answers; only one is allowed",
                group.text, correct
            )));
        }
        if correct == 0 {
            tracing::warn!(question = %group.text, "imported question has no correct answer");
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
}

impl ImportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replaces every question of the quiz with `groups` in one transaction.
    pub async fn import_questions(
        &self,
        quiz_id: Uuid,
        groups: &[ImportedQuestion],
    ) -> Result<ImportSummary> {
        validate_groups(groups)?;

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut answers_imported = 0;
        for (position, group) in groups.iter().enumerate() {
            let question_id: Uuid = sqlx::query_scalar(
                r#"INSERT INTO questions (quiz_id, text, position) VALUES ($1, $2, $3) RETURNING id"#,
            )
            .bind(quiz_id)
            .bind(&group.text)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;

            for (answer_position, answer) in group.answers.iter().enumerate() {
                sqlx::query(
                    r#"INSERT INTO answers (question_id, text, is_correct, position) VALUES ($1, $2, $3, $4)"#,
                )
                .bind(question_id)
                .bind(&answer.text)
                .bind(answer.is_correct)
                .bind(answer_position as i32)
                .execute(&mut *tx)
                .await?;
                answers_imported += 1;
            }
        }

        tx.commit().await?;

        tracing::info!(
            %quiz_id,
            removed,
            questions = groups.len(),
            answers = answers_imported,
            "quiz questions replaced"
        );

        Ok(ImportSummary {
            quiz_id,
            questions_imported: groups.len(),
            answers_imported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_answers_under_the_same_question() {
        let csv = "question,answer,is_correct\n\
                   Best language?,Rust,true\n\
                   Best language?,COBOL,false\n";
        let groups = parse_quiz_file(csv.as_bytes()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, "Best language?");
        assert_eq!(
            groups[0].answers,
            vec![
                ImportedAnswer { text: "Rust".into(), is_correct: true },
                ImportedAnswer { text: "COBOL".into(), is_correct: false },
            ]
        );
    }

    #[test]
    fn skips_rows_with_empty_answer_or_question() {
        let csv = "question,answer,is_correct\n\
                   Q1,,true\n\
                   ,A,true\n\
                   Q2,  A2  ,TRUE\n";
        let groups = parse_quiz_file(csv.as_bytes()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, "Q2");
        assert_eq!(groups[0].answers[0].text, "A2");
        assert!(groups[0].answers[0].is_correct);
    }

    #[test]
    fn keeps_first_seen_question_order() {
        let csv = "question,answer,is_correct\n\
                   B,1,true\n\
                   A,2,true\n\
                   B,3,false\n";
        let groups = parse_quiz_file(csv.as_bytes()).unwrap();
        let order: Vec<&str> = groups.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(groups[0].answers.len(), 2);
    }

    #[test]
    fn is_correct_only_accepts_literal_true() {
        let csv = "question,answer,is_correct\n\
                   Q,a,yes\n\
                   Q,b,1\n\
                   Q,c,True\n";
        let groups = parse_quiz_file(csv.as_bytes()).unwrap();
        let flags: Vec<bool> = groups[0].answers.iter().map(|a| a.is_correct).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn headers_are_matched_loosely_and_extra_columns_ignored() {
        let csv = " Answer ,notes,QUESTION,Is_Correct\n\
                   Paris,capital,Capital of France?,true\n\
                   Short row\n";
        let groups = parse_quiz_file(csv.as_bytes()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].answers[0].text, "Paris");
    }

    #[test]
    fn missing_column_is_rejected() {
        let csv = "question,answer\nQ,A\n";
        let err = parse_quiz_file(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let mut bytes = b"question,answer,is_correct\nQ,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",true\n");
        assert!(matches!(parse_quiz_file(&bytes[..]), Err(Error::Csv(_))));
    }

    #[test]
    fn nul_characters_are_rejected() {
        let csv = "question,answer,is_correct\nQ,ok,true\nQ,b\u{0}d,false\n";
        match parse_quiz_file(csv.as_bytes()) {
            Err(Error::BadRequest(msg)) => assert!(msg.contains("line 3"), "got {}", msg),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn validation_rejects_multiple_correct_answers() {
        let groups = vec![ImportedQuestion {
            text: "Q".into(),
            answers: vec![
                ImportedAnswer { text: "a".into(), is_correct: true },
                ImportedAnswer { text: "b".into(), is_correct: true },
            ],
        }];
        assert!(matches!(validate_groups(&groups), Err(Error::BadRequest(_))));
    }

    #[test]
    fn validation_rejects_empty_import() {
        assert!(validate_groups(&[]).is_err());
    }

    #[test]
    fn validation_accepts_single_or_no_correct_answer() {
        let groups = vec![
            ImportedQuestion {
                text: "Q1".into(),
                answers: vec![ImportedAnswer { text: "a".into(), is_correct: true }],
            },
            ImportedQuestion {
                text: "Q2".into(),
                answers: vec![ImportedAnswer { text: "b".into(), is_correct: false }],
            },
        ];
        assert!(validate_groups(&groups).is_ok());
    }
}
