use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    message: String,
    #[serde(rename = "errorType")]
    error_type: &'static str,
    data: serde_json::Value,
}

/// Failure taxonomy rendered by the single responder below. Every operation
/// classifies its own failures into one of these; nothing is retried and the
/// envelope shape is the same for all of them.
#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(String),
    Conflict(String),
    /// A declared field rule was violated; the message is the first failing
    /// rule's message.
    Validation(String),
    /// Storage or unexpected failure during an otherwise-valid request.
    /// Carries the operation's generic message; the source is logged, not
    /// echoed.
    Operation(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Operation`
    /// variant carrying the operation's generic message.
    pub(crate) fn operation(err: impl std::fmt::Display, message: &str) -> Self {
        tracing::error!(error = %err, "{message}");
        Self::Operation(message.to_string())
    }

    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::Operation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Operation(_) => "operation_failed",
            ApiError::Internal(_) => "unknown",
        }
    }

    fn into_message(self) -> String {
        match self {
            ApiError::Unauthorized(message) | ApiError::Forbidden(message) => message.to_string(),
            ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Validation(message)
            | ApiError::Operation(message)
            | ApiError::Internal(message) => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.error_type();
        let unauthorized = matches!(self, ApiError::Unauthorized(_));

        let envelope = ErrorEnvelope {
            message: self.into_message(),
            error_type,
            data: serde_json::Value::Null,
        };
        let mut response = (status, Json(envelope)).into_response();

        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn not_found_renders_envelope() {
        let (status, json) = render(ApiError::NotFound("Could not find exam!".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Could not find exam!");
        assert_eq!(json["errorType"], "not_found");
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn validation_maps_to_422() {
        let (status, json) =
            render(ApiError::Validation("Title must be at least 3 characters long".to_string()))
                .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["errorType"], "validation_failed");
    }

    #[tokio::test]
    async fn operation_failure_maps_to_422() {
        let (status, json) =
            render(ApiError::Operation("Failed to fetch exams!".to_string())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["errorType"], "operation_failed");
        assert_eq!(json["message"], "Failed to fetch exams!");
    }

    #[tokio::test]
    async fn unauthorized_carries_challenge_header() {
        let response = ApiError::Unauthorized("Invalid authentication credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );
    }

    #[tokio::test]
    async fn internal_maps_to_500_unknown() {
        let (status, json) = render(ApiError::Internal("boom".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["errorType"], "unknown");
    }
}
