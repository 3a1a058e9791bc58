//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use course_store::{CourseStoreError, FieldErrors};
use serde::Serialize;
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub detail: Option<serde_json::Value>,
}

/// Where a validated value came from, reported alongside field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLocation {
    Json,
    Query,
}

impl InputLocation {
    fn as_str(self) -> &'static str {
        match self {
            InputLocation::Json => "json",
            InputLocation::Query => "query",
        }
    }
}

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Request input failed field validation.
    Validation {
        location: InputLocation,
        errors: FieldErrors,
    },
    /// The request was rejected by an extractor before reaching the handler.
    Rejected { status: StatusCode, message: String },
    /// Missing or unknown API token.
    Unauthorized,
    /// A destructive operation was requested without confirmation.
    ConfirmationMissing,
    /// Course store error.
    Store(CourseStoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Validation { location, errors } => validation_response(location, errors),
            ApiError::Rejected { status, message } => (status, message, None),
            ApiError::Unauthorized => {
                let body = ErrorResponse {
                    error: "Unauthorized".to_string(),
                    detail: None,
                };
                let mut response = (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer realm=\"Authentication Required\""),
                );
                return response;
            }
            ApiError::ConfirmationMissing => (
                StatusCode::BAD_REQUEST,
                "confirmation is missing".to_string(),
                Some(serde_json::json!({ "error": "check the API for how to confirm" })),
            ),
            ApiError::Store(err) => store_error_to_response(err),
        };

        (status, axum::Json(ErrorResponse { error, detail })).into_response()
    }
}

fn validation_response(
    location: InputLocation,
    errors: FieldErrors,
) -> (StatusCode, String, Option<serde_json::Value>) {
    let detail = serde_json::json!({ location.as_str(): errors });
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        "Validation error".to_string(),
        Some(detail),
    )
}

fn store_error_to_response(err: CourseStoreError) -> (StatusCode, String, Option<serde_json::Value>) {
    match err {
        CourseStoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string(), None),
        CourseStoreError::Validation(errors) => validation_response(InputLocation::Json, errors),
        CourseStoreError::InvalidSchema(_) | CourseStoreError::Database(_) => {
            tracing::error!(error = %err, "course store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
                None,
            )
        }
    }
}

impl From<CourseStoreError> for ApiError {
    fn from(err: CourseStoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

// Query strings that do not deserialize are invalid input, not malformed requests.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: rejection.body_text(),
        }
    }
}
