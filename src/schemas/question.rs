use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::listing::PaginationMeta;
use crate::api::validation::{check, not_blank};
use crate::core::time::format_primitive;
use crate::db::models::Question;
use crate::db::types::QuestionType;
use crate::repositories::questions::QuestionWithExamRow;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionCreate {
    #[serde(default)]
    pub(crate) exam_id: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) question_type: QuestionType,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    pub(crate) correct_answer: String,
    #[serde(default)]
    pub(crate) marks: Option<i32>,
}

impl QuestionCreate {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        check(&[
            (not_blank(&self.title), "Question title is required"),
            (not_blank(&self.exam_id), "Exam ID is required"),
            (options_present(&self.options), "At least one option is required"),
            (not_blank(&self.correct_answer), "Correct answer is required"),
            (self.marks.is_some_and(|marks| marks >= 0), "Marks must be a positive number"),
        ])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionUpdate {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) question_type: QuestionType,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default)]
    pub(crate) correct_answer: String,
    #[serde(default)]
    pub(crate) marks: Option<i32>,
}

impl QuestionUpdate {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        check(&[
            (not_blank(&self.title), "Question title is required"),
            (options_present(&self.options), "At least one option is required"),
            (not_blank(&self.correct_answer), "Correct answer is required"),
            (self.marks.is_some_and(|marks| marks >= 0), "Marks must be a positive number"),
        ])
    }
}

fn options_present(options: &[String]) -> bool {
    !options.is_empty()
}

/// Declared expansion of an exam reference: identifier and title only.
#[derive(Debug, Serialize)]
pub(crate) struct ExamRef {
    pub(crate) id: String,
    pub(crate) title: String,
}

/// A bare question as returned by write operations (reference not expanded).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) title: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
    pub(crate) marks: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            exam_id: question.exam_id,
            title: question.title,
            question_type: question.question_type,
            options: question.options,
            correct_answer: question.correct_answer,
            marks: question.marks,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

/// A question as returned by reads: exam reference expanded, relevance score
/// present only when the query searched.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionItem {
    pub(crate) id: String,
    pub(crate) exam_id: ExamRef,
    pub(crate) title: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
    pub(crate) marks: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<f64>,
}

impl QuestionItem {
    pub(crate) fn from_row(row: QuestionWithExamRow) -> Self {
        Self {
            id: row.id,
            exam_id: ExamRef { id: row.exam_id, title: row.exam_title },
            title: row.title,
            question_type: row.question_type,
            options: row.options,
            correct_answer: row.correct_answer,
            marks: row.marks,
            created_at: format_primitive(row.created_at),
            updated_at: format_primitive(row.updated_at),
            score: row.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionListEnvelope {
    pub(crate) message: String,
    pub(crate) questions: Vec<QuestionItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pagination: Option<PaginationMeta>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionDetailEnvelope {
    pub(crate) message: String,
    pub(crate) question: QuestionItem,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionWriteEnvelope {
    pub(crate) message: String,
    pub(crate) question: QuestionResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionDeleteEnvelope {
    pub(crate) message: String,
    pub(crate) question_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> QuestionCreate {
        QuestionCreate {
            exam_id: "exam-1".to_string(),
            title: "2 + 2 = ?".to_string(),
            question_type: QuestionType::Radio,
            options: vec!["3".to_string(), "4".to_string()],
            correct_answer: "4".to_string(),
            marks: Some(5),
        }
    }

    #[test]
    fn valid_create_passes() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn missing_options_fail() {
        let mut payload = valid_create();
        payload.options = Vec::new();
        match payload.validate() {
            Err(ApiError::Validation(message)) => {
                assert_eq!(message, "At least one option is required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn negative_marks_fail() {
        let mut payload = valid_create();
        payload.marks = Some(-1);
        match payload.validate() {
            Err(ApiError::Validation(message)) => {
                assert_eq!(message, "Marks must be a positive number");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn absent_marks_fail() {
        let mut payload = valid_create();
        payload.marks = None;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn zero_marks_pass() {
        let mut payload = valid_create();
        payload.marks = Some(0);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn title_rule_fires_before_exam_rule() {
        let mut payload = valid_create();
        payload.title = String::new();
        payload.exam_id = String::new();
        match payload.validate() {
            Err(ApiError::Validation(message)) => {
                assert_eq!(message, "Question title is required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn item_expands_exam_reference() {
        let item = QuestionItem {
            id: "q1".to_string(),
            exam_id: ExamRef { id: "e1".to_string(), title: "Midterm".to_string() },
            title: "2 + 2 = ?".to_string(),
            question_type: QuestionType::Radio,
            options: vec!["3".to_string(), "4".to_string()],
            correct_answer: "4".to_string(),
            marks: 5,
            created_at: "2025-01-02T10:20:30Z".to_string(),
            updated_at: "2025-01-02T10:20:30Z".to_string(),
            score: None,
        };
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["examId"]["id"], "e1");
        assert_eq!(json["examId"]["title"], "Midterm");
        assert_eq!(json["correctAnswer"], "4");
        assert_eq!(json["questionType"], "radio");
        assert!(json.get("score").is_none());
    }
}
