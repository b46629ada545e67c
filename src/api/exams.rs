use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::listing::{self, PageWindow, PaginationMeta};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::exams::ExamListSpec;
use crate::schemas::exam::{
    ExamCreate, ExamDeleteEnvelope, ExamDetailEnvelope, ExamItem, ExamListEnvelope, ExamResponse,
    ExamUpdate, ExamWriteEnvelope,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ExamListQuery {
    #[serde(default, rename = "_q")]
    q: Option<String>,
    #[serde(default, rename = "_page")]
    page: Option<i64>,
    #[serde(default, rename = "_limit")]
    limit: Option<i64>,
    #[serde(default, rename = "_courseId")]
    course_id: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams).post(create_exam))
        .route("/:exam_id", get(get_exam).put(update_exam).delete(delete_exam))
        .route("/:course_id/course", get(list_exams_by_course))
}

async fn list_exams(
    Query(params): Query<ExamListQuery>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ExamListEnvelope>, ApiError> {
    let spec = ExamListSpec {
        search: listing::normalize_search(params.q),
        course_id: listing::normalize_reference(params.course_id),
        window: PageWindow::from_params(params.page, params.limit),
    };

    let rows = repositories::exams::list(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch exams!"))?;
    let total_rows = repositories::exams::count(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch exams!"))?;

    Ok(Json(ExamListEnvelope {
        message: "Fetch all exams successfully!".to_string(),
        exams: rows.into_iter().map(ExamItem::from_row).collect(),
        pagination: Some(PaginationMeta::new(params.page, params.limit, total_rows)),
    }))
}

async fn get_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ExamDetailEnvelope>, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch exam!"))?;

    let Some(exam) = exam else {
        return Err(ApiError::NotFound("Could not find exam!".to_string()));
    };

    Ok(Json(ExamDetailEnvelope {
        message: "Fetch single exam successfully!".to_string(),
        exam: ExamItem::from_row(exam),
    }))
}

async fn list_exams_by_course(
    axum::extract::Path(course_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<ExamListEnvelope>, ApiError> {
    let spec = ExamListSpec { course_id: Some(course_id), ..ExamListSpec::default() };

    let rows = repositories::exams::list(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch exams for course!"))?;

    Ok(Json(ExamListEnvelope {
        message: "Fetch exams by course successfully!".to_string(),
        exams: rows.into_iter().map(ExamItem::from_row).collect(),
        pagination: None,
    }))
}

async fn create_exam(
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(axum::http::StatusCode, Json<ExamWriteEnvelope>), ApiError> {
    payload.validate()?;

    let now = primitive_now_utc();
    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            course_id: payload.course_id.trim(),
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::operation(e, "Failed to create exam!"))?;

    tracing::info!(
        admin_id = %admin.id,
        exam_id = %exam.id,
        action = "exam_create",
        "Exam created"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ExamWriteEnvelope {
            message: "Exam created successfully!".to_string(),
            exam: ExamResponse::from_db(exam),
        }),
    ))
}

async fn update_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamWriteEnvelope>, ApiError> {
    payload.validate()?;

    let existing = repositories::exams::exists_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to update exam!"))?;

    if existing.is_none() {
        return Err(ApiError::NotFound("Could not find exam!".to_string()));
    }

    let exam = repositories::exams::update(
        state.db(),
        &exam_id,
        repositories::exams::UpdateExam {
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::operation(e, "Failed to update exam!"))?;

    Ok(Json(ExamWriteEnvelope {
        message: "Exam updated successfully!".to_string(),
        exam: ExamResponse::from_db(exam),
    }))
}

async fn delete_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<ExamDeleteEnvelope>, ApiError> {
    let removed = repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to delete exam!"))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Could not find exam!".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        exam_id = %exam_id,
        action = "exam_delete",
        "Exam deleted"
    );

    Ok(Json(ExamDeleteEnvelope {
        message: "Exam deleted successfully!".to_string(),
        exam_id,
    }))
}
