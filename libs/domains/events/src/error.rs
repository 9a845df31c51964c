use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::{DaoError, FieldErrors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Dao(#[from] DaoError),

    #[error("Invalid event form: {0}")]
    InvalidForm(FieldErrors),

    /// JSON:API document carried a `type` other than the endpoint's
    #[error("Expected resource type '{expected}', got '{found}'")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("{0}")]
    BadDocument(String),
}

pub type EventResult<T> = Result<T, EventError>;

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Dao(dao) => dao.into(),
            EventError::InvalidForm(fields) => AppError::Validation(fields),
            EventError::TypeMismatch { .. } => AppError::TypeMismatch(err.to_string()),
            EventError::BadDocument(msg) => AppError::BadRequest(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
