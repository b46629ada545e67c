use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::listing::PaginationMeta;
use crate::api::validation::{check, min_len};
use crate::core::time::format_primitive;
use crate::db::models::Course;
use crate::repositories::courses::CourseSearchRow;

const NAME_MIN_LEN: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoursePayload {
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

impl CoursePayload {
    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        check(&[(min_len(&self.name, NAME_MIN_LEN), "Name must be at least 3 characters long")])
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            description: course.description,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseItem {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score: Option<f64>,
}

impl CourseItem {
    pub(crate) fn from_row(row: CourseSearchRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: format_primitive(row.created_at),
            updated_at: format_primitive(row.updated_at),
            score: row.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseListEnvelope {
    pub(crate) message: String,
    pub(crate) courses: Vec<CourseItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pagination: Option<PaginationMeta>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseDetailEnvelope {
    pub(crate) message: String,
    pub(crate) course: CourseResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseDeleteEnvelope {
    pub(crate) message: String,
    pub(crate) course_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_fails() {
        let payload = CoursePayload { name: "ab".to_string(), description: None };
        match payload.validate() {
            Err(ApiError::Validation(message)) => {
                assert_eq!(message, "Name must be at least 3 characters long");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_name_passes() {
        let payload = CoursePayload { name: "Algebra".to_string(), description: None };
        assert!(payload.validate().is_ok());
    }
}
