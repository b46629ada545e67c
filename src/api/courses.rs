use axum::{extract::Query, routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::listing::{self, PageWindow, PaginationMeta};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::courses::CourseListSpec;
use crate::schemas::course::{
    CourseDeleteEnvelope, CourseDetailEnvelope, CourseItem, CourseListEnvelope, CoursePayload,
    CourseResponse,
};

#[derive(Debug, Deserialize)]
pub(crate) struct CourseListQuery {
    #[serde(default, rename = "_q")]
    q: Option<String>,
    #[serde(default, rename = "_page")]
    page: Option<i64>,
    #[serde(default, rename = "_limit")]
    limit: Option<i64>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course).put(update_course).delete(delete_course))
}

async fn list_courses(
    Query(params): Query<CourseListQuery>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<CourseListEnvelope>, ApiError> {
    let spec = CourseListSpec {
        search: listing::normalize_search(params.q),
        window: PageWindow::from_params(params.page, params.limit),
    };

    let rows = repositories::courses::list(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch courses!"))?;
    let total_rows = repositories::courses::count(state.db(), &spec)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch courses!"))?;

    Ok(Json(CourseListEnvelope {
        message: "Fetch all courses successfully!".to_string(),
        courses: rows.into_iter().map(CourseItem::from_row).collect(),
        pagination: Some(PaginationMeta::new(params.page, params.limit, total_rows)),
    }))
}

async fn get_course(
    axum::extract::Path(course_id): axum::extract::Path<String>,
    CurrentUser(_user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<CourseDetailEnvelope>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to fetch course!"))?;

    let Some(course) = course else {
        return Err(ApiError::NotFound("Could not find course!".to_string()));
    };

    Ok(Json(CourseDetailEnvelope {
        message: "Fetch single course successfully!".to_string(),
        course: CourseResponse::from_db(course),
    }))
}

async fn create_course(
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<CoursePayload>,
) -> Result<(axum::http::StatusCode, Json<CourseDetailEnvelope>), ApiError> {
    payload.validate()?;

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            description: payload.description.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::operation(e, "Failed to create course!"))?;

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course.id,
        action = "course_create",
        "Course created"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CourseDetailEnvelope {
            message: "Course created successfully!".to_string(),
            course: CourseResponse::from_db(course),
        }),
    ))
}

async fn update_course(
    axum::extract::Path(course_id): axum::extract::Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
    Json(payload): Json<CoursePayload>,
) -> Result<Json<CourseDetailEnvelope>, ApiError> {
    payload.validate()?;

    let existing = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to update course!"))?;

    if existing.is_none() {
        return Err(ApiError::NotFound("Could not find course!".to_string()));
    }

    let course = repositories::courses::update(
        state.db(),
        &course_id,
        repositories::courses::UpdateCourse {
            name: payload.name.trim(),
            description: payload.description.as_deref(),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::operation(e, "Failed to update course!"))?;

    Ok(Json(CourseDetailEnvelope {
        message: "Course updated successfully!".to_string(),
        course: CourseResponse::from_db(course),
    }))
}

async fn delete_course(
    axum::extract::Path(course_id): axum::extract::Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    state: axum::extract::State<AppState>,
) -> Result<Json<CourseDeleteEnvelope>, ApiError> {
    let removed = repositories::courses::delete_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::operation(e, "Failed to delete course!"))?;

    if removed == 0 {
        return Err(ApiError::NotFound("Could not find course!".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course_id,
        action = "course_delete",
        "Course deleted"
    );

    Ok(Json(CourseDeleteEnvelope {
        message: "Course deleted successfully!".to_string(),
        course_id,
    }))
}
