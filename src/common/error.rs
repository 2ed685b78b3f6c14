// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
///
/// Only `UnsupportedFormat`, `ExtractionFailed` and `EmptyExtraction` are
/// expected to reach the uploader from the processing pipeline. Everything
/// downstream of a successful extraction degrades to a deterministic fallback
/// instead of surfacing an error.
#[derive(Debug)]
pub enum ApiError {
    UnsupportedFormat(String),
    ExtractionFailed { filename: String, format: String },
    EmptyExtraction(String),
    BadRequest(String),
    NotFound(String),
    InternalServer(String),
    ServiceUnavailable(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnsupportedFormat(ext) => write!(f, "Unsupported Format: {}", ext),
            ApiError::ExtractionFailed { filename, format } => {
                write!(f, "Extraction Failed: {} ({})", filename, format)
            }
            ApiError::EmptyExtraction(msg) => write!(f, "Empty Extraction: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::UnsupportedFormat(ext) => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Unsupported file type '{}'. Please upload PDF, DOC, DOCX, or TXT files.",
                    ext
                ),
                "UNSUPPORTED_FORMAT",
            ),
            ApiError::ExtractionFailed { filename, format } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!(
                    "Could not extract text from {} ({} document)",
                    filename, format
                ),
                "EXTRACTION_FAILED",
            ),
            ApiError::EmptyExtraction(msg) => (StatusCode::BAD_REQUEST, msg, "EMPTY_EXTRACTION"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
