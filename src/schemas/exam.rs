use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::listing::PaginationMeta;
use crate::api::validation::{check, min_len, not_blank};
use crate::core::time::format_primitive;
use crate::db::models::Exam;
use crate::repositories::exams::ExamWithCourseRow;

pub(crate) const TITLE_MIN_LEN: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamCreate {
    #[serde(default)]
    pub(crate) course_id: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

impl ExamCreate {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        check(&[
            (min_len(&self.title, TITLE_MIN_LEN), "Title must be at least 3 characters long"),
            (not_blank(&self.course_id), "Course ID is required"),
        ])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

impl ExamUpdate {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        check(&[(min_len(&self.title, TITLE_MIN_LEN), "Title must be at least 3 characters long")])
    }
}

/// Declared expansion of a course reference: identifier and name only.
#[derive(Debug, Serialize)]
pub(crate) struct CourseRef {
    pub(crate) id: String,
    pub(crate) name: String,
}

/// A bare exam as returned by write operations (reference not expanded).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam) -> Self {
        Self {
            id: exam.id,
            course_id: exam.course_id,
            title: exam.title,
            description: exam.description,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

/// An exam as returned by reads: course reference expanded, relevance score
/// present only when the query searched.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamItem {
    pub(crate) id: String,
    pub(crate) course_id: CourseRef,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<f64>,
}

impl ExamItem {
    pub(crate) fn from_row(row: ExamWithCourseRow) -> Self {
        Self {
            id: row.id,
            course_id: CourseRef { id: row.course_id, name: row.course_name },
            title: row.title,
            description: row.description,
            created_at: format_primitive(row.created_at),
            updated_at: format_primitive(row.updated_at),
            score: row.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamListEnvelope {
    pub(crate) message: String,
    pub(crate) exams: Vec<ExamItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pagination: Option<PaginationMeta>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamDetailEnvelope {
    pub(crate) message: String,
    pub(crate) exam: ExamItem,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamWriteEnvelope {
    pub(crate) message: String,
    pub(crate) exam: ExamResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamDeleteEnvelope {
    pub(crate) message: String,
    pub(crate) exam_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_title_before_course() {
        let payload = ExamCreate {
            course_id: String::new(),
            title: "ab".to_string(),
            description: None,
        };
        match payload.validate() {
            Err(ApiError::Validation(message)) => {
                assert_eq!(message, "Title must be at least 3 characters long");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_requires_course_id() {
        let payload = ExamCreate {
            course_id: "  ".to_string(),
            title: "Midterm".to_string(),
            description: None,
        };
        match payload.validate() {
            Err(ApiError::Validation(message)) => assert_eq!(message, "Course ID is required"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_create_passes() {
        let payload = ExamCreate {
            course_id: "course-1".to_string(),
            title: "Midterm".to_string(),
            description: Some("Week 7".to_string()),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn score_is_omitted_when_absent() {
        let item = ExamItem {
            id: "e1".to_string(),
            course_id: CourseRef { id: "c1".to_string(), name: "Algebra".to_string() },
            title: "Midterm".to_string(),
            description: None,
            created_at: "2025-01-02T10:20:30Z".to_string(),
            updated_at: "2025-01-02T10:20:30Z".to_string(),
            score: None,
        };
        let json = serde_json::to_value(&item).expect("serialize");
        assert!(json.get("score").is_none());
        assert_eq!(json["courseId"]["id"], "c1");
        assert_eq!(json["courseId"]["name"], "Algebra");
    }
}
