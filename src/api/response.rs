//! Response types for the RTI engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP statuses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RtiError;
use crate::models::{FilingDocument, Submission};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a submission not found error response.
    pub fn submission_not_found(id: Uuid) -> Self {
        Self::with_details(
            "SUBMISSION_NOT_FOUND",
            format!("Submission not found: {}", id),
            format!("No submission with id '{}' exists", id),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates an error response with the given status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RtiError> for ApiErrorResponse {
    fn from(error: RtiError) -> Self {
        let message = error.to_string();
        match error {
            RtiError::ConfigNotFound { .. } | RtiError::ConfigParseError { .. } => {
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                )
            }
            RtiError::SubmissionNotFound { id } => {
                ApiErrorResponse::new(StatusCode::NOT_FOUND, ApiError::submission_not_found(id))
            }
            RtiError::FilingNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("FILING_NOT_FOUND", message),
            ),
            RtiError::MissingFilingDocument { .. }
            | RtiError::FilingTypeMismatch { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(message),
            ),
            RtiError::FilingAlreadyLinked { .. } | RtiError::ConcurrentModification { .. } => {
                ApiErrorResponse::new(StatusCode::CONFLICT, ApiError::new("CONFLICT", message))
            }
            RtiError::InvalidTransition { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("INVALID_STATUS", message),
            ),
            RtiError::Gateway { .. } => ApiErrorResponse::new(
                StatusCode::BAD_GATEWAY,
                ApiError::with_details("GATEWAY_ERROR", "Filing gateway error", message),
            ),
            RtiError::Storage { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage error", message),
            ),
        }
    }
}

/// Response body for the filing endpoints: the stored document and the
/// draft submission created for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingCreated {
    /// The stored filing document.
    pub filing: FilingDocument,
    /// The draft submission.
    pub submission: Submission,
}
