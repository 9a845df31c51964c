pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::{DaoError, FieldErrors};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every error response
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "Request validation failed",
///   "details": { "email": ["must be a valid email address"] }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    pub message: String,
    /// Field path to messages, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Error type returned by every handler
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

/// Query-string failures become field errors keyed by the offending parameter.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        let reason = text
            .strip_prefix("Failed to deserialize query string: ")
            .unwrap_or(&text);

        let fields = match reason.split_once(": ") {
            Some((field, message)) if !field.is_empty() && !field.contains(' ') => {
                FieldErrors::single(field, message)
            }
            _ => FieldErrors::single("query", reason),
        };
        Self::Validation(fields)
    }
}

impl From<DaoError> for AppError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound { .. } => Self::NotFound(err.to_string()),
            DaoError::Validation(fields) => Self::Validation(fields),
            DaoError::Conflict(detail) => Self::Conflict(detail),
            DaoError::Database(db) => Self::Database(db),
            DaoError::Internal(msg) => Self::InternalServerError(msg),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidId(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::JsonExtractorRejection(rejection) => rejection.status(),
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::TypeMismatch(_) => StatusCode::CONFLICT,
            Self::Database(DbErr::ConnectionAcquire(_)) | Self::ServiceUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Database(_) | Self::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            Self::InvalidId(_) => ErrorCode::InvalidId,
            Self::BadRequest(_) => ErrorCode::ValidationError,
            Self::Unauthorized(_) => ErrorCode::Unauthorized,
            Self::Forbidden(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::TypeMismatch(_) => ErrorCode::ResourceTypeMismatch,
            Self::Database(DbErr::ConnectionAcquire(_)) => ErrorCode::DatabasePoolTimeout,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::InternalServerError(_) => ErrorCode::InternalError,
            Self::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = %self, "Request failed");
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
        }

        let (message, details) = match self {
            Self::Validation(fields) => (
                code.default_message().to_string(),
                serde_json::to_value(&fields).ok(),
            ),
            Self::JsonExtractorRejection(rejection) => (rejection.body_text(), None),
            // Database internals stay in the logs.
            Self::Database(_) => (code.default_message().to_string(), None),
            Self::InvalidId(msg)
            | Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::TypeMismatch(msg)
            | Self::InternalServerError(msg)
            | Self::ServiceUnavailable(msg) => (msg, None),
        };

        let body = ErrorResponse {
            details,
            ..ErrorResponse::new(code, message)
        };

        (status, Json(body)).into_response()
    }
}

/// Builds an error response outside of the `AppError` flow, e.g. in middleware.
pub fn error_response(status: StatusCode, message: impl Into<String>, code: ErrorCode) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}
