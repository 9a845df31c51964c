use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::DaoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Dao(#[from] DaoError),

    /// A valid token whose subject no longer exists
    #[error("User {0} no longer exists")]
    UnknownCaller(i32),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Dao(dao) => dao.into(),
            UserError::UnknownCaller(_) => AppError::Unauthorized(err.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
