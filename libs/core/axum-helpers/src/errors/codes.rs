//! Error codes shared by every error response.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Machine-readable identifier, numeric code and default message of an error
///
/// Numeric ranges: 1000-1999 client errors and generic server faults,
/// 2000-2999 database faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    /// Path parameter is not a valid identifier
    InvalidId,
    JsonExtraction,
    NotFound,
    InternalError,
    Unauthorized,
    Forbidden,
    Conflict,
    /// JSON:API document carries a `type` other than the endpoint's
    ResourceTypeMismatch,
    ServiceUnavailable,
    DatabaseError,
    DatabasePoolTimeout,
}

impl ErrorCode {
    fn parts(&self) -> (&'static str, i32, &'static str) {
        match self {
            Self::ValidationError => ("VALIDATION_ERROR", 1001, "Request validation failed"),
            Self::InvalidId => ("INVALID_ID", 1002, "Invalid resource identifier"),
            Self::JsonExtraction => ("JSON_EXTRACTION", 1003, "Failed to parse request body"),
            Self::NotFound => ("NOT_FOUND", 1004, "Resource not found"),
            Self::InternalError => ("INTERNAL_ERROR", 1005, "An internal server error occurred"),
            Self::Unauthorized => ("UNAUTHORIZED", 1006, "Authentication required"),
            Self::Forbidden => ("FORBIDDEN", 1007, "Access forbidden"),
            Self::Conflict => ("CONFLICT", 1008, "Resource already exists"),
            Self::ResourceTypeMismatch => (
                "RESOURCE_TYPE_MISMATCH",
                1009,
                "Resource type does not match the endpoint",
            ),
            Self::ServiceUnavailable => (
                "SERVICE_UNAVAILABLE",
                1011,
                "Service is temporarily unavailable",
            ),
            Self::DatabaseError => ("DATABASE_ERROR", 2003, "Database error occurred"),
            Self::DatabasePoolTimeout => (
                "DATABASE_POOL_TIMEOUT",
                2013,
                "Database connection pool timed out",
            ),
        }
    }

    /// SCREAMING_SNAKE_CASE identifier sent to clients
    pub fn as_str(&self) -> &'static str {
        self.parts().0
    }

    /// Integer code for logs and metrics
    pub fn code(&self) -> i32 {
        self.parts().1
    }

    pub fn default_message(&self) -> &'static str {
        self.parts().2
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
