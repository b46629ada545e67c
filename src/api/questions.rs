use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::listing::{self, PageWindow, PaginationMeta};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::questions::QuestionListSpec;
use crate::schemas::question::{
    QuestionCreate, QuestionDeleteEnvelope, QuestionDetailEnvelope, QuestionItem,
    QuestionListEnvelope, QuestionResponse, QuestionUpdate, QuestionWriteEnvelope,
};

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionListQuery {
    #[serde(default, rename = "_q")]
    q: Option<String>,
    #[serde(default, rename = "_page")]
    page: Option<i64>,
    #[serde(default, rename = "_limit")]
    limit: Option<i64>,
    #[serde(default, rename = "_examId")]
    exam_id: Option<String>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route("/:question_id", get(get_question).put(update_question).delete(delete_question))
        .route("/:exam_id/exam", get(list_questions_by_exam))
}

async fn list_questions(
    Query(params): Query<QuestionListQuery>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<QuestionListEnvelope>, ApiError> {
    let spec = QuestionListSpec {
        search: listing::normalize_search(params.q),
        exam_id: listing::normalize_reference(params.exam_id),
        window: PageWindow::from_params(params.page, params.limit),
    };

    let rows = repositories::questions::list(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch questions!"))?;
    let total_rows = repositories::questions::count(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch questions!"))?;

    Ok(Json(QuestionListEnvelope {
        message: "Fetch all questions successfully!".to_string(),
        questions: rows.into_iter().map(QuestionItem::from_row).collect(),
        pagination: Some(PaginationMeta::new(params.page, params.limit, total_rows)),
    }))
}

async fn get_question(
    axum::extract::Path(question_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<QuestionDetailEnvelope>, ApiError> {
    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch question!"))?;

    let Some(question) = question else {
        return Err(ApiError::NotFound("Question not found!".to_string()));
    };

    Ok(Json(QuestionDetailEnvelope {
        message: "Fetch question successfully!".to_string(),
        question: QuestionItem::from_row(question),
    }))
}

async fn list_questions_by_exam(
    axum::extract::Path(exam_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<QuestionListEnvelope>, ApiError> {
    let spec = QuestionListSpec { exam_id: Some(exam_id), ..QuestionListSpec::default() };

    let rows = repositories::questions::list(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch questions for exam!"))?;

    Ok(Json(QuestionListEnvelope {
        message: "Fetch questions by exam successfully!".to_string(),
        questions: rows.into_iter().map(QuestionItem::from_row).collect(),
        pagination: None,
    }))
}

async fn create_question(
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(axum::http::StatusCode, Json<QuestionWriteEnvelope>), ApiError> {
    payload.validate()?;

    let now = primitive_now_utc();
    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            exam_id: payload.exam_id.trim(),
            title: payload.title.trim(),
            question_type: payload.question_type,
            options: &payload.options,
            correct_answer: payload.correct_answer.trim(),
            marks: payload.marks.unwrap_or(0),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::operation(e, "Failed to create question!"))?;

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question.id,
        action = "question_create",
        "Question created"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(QuestionWriteEnvelope {
            message: "Question created successfully!".to_string(),
            question: QuestionResponse::from_db(question),
        }),
    ))
}

async fn update_question(
    axum::extract::Path(question_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionWriteEnvelope>, ApiError> {
    payload.validate()?;

    let existing = repositories::questions::exists_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to update question!"))?;

    if existing.is_none() {
        return Err(ApiError::NotFound("Question not found!".to_string()));
    }

    let question = repositories::questions::update(
        state.db(),
        &question_id,
        repositories::questions::UpdateQuestion {
            title: payload.title.trim(),
            question_type: payload.question_type,
            options: &payload.options,
            correct_answer: payload.correct_answer.trim(),
            marks: payload.marks.unwrap_or(0),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::operation(e, "Failed to update question!"))?;

    Ok(Json(QuestionWriteEnvelope {
        message: "Question updated successfully!".to_string(),
        question: QuestionResponse::from_db(question),
    }))
}

async fn delete_question(
    axum::extract::Path(question_id): axum::extract::Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<QuestionDeleteEnvelope>, ApiError> {
    let removed = repositories::questions::delete_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to delete question!"))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Question not found!".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question_id,
        action = "question_delete",
        "Question deleted"
    );

    Ok(Json(QuestionDeleteEnvelope {
        message: "Question deleted successfully!".to_string(),
        question_id,
    }))
}
