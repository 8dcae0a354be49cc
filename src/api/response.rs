//! Response types for the Payroll Engine API.
//!
//! This module defines the error response structures and maps [`PayrollError`]
//! onto HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

/// JSON body of every failed request: `{code, message, details?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable upper-case code, e.g. `ALREADY_PROCESSED`.
    pub code: String,
    /// The error's display text.
    pub message: String,
    /// What the failure left behind, when that is not obvious from the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// An error without details.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// An error with a details line.
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

    /// A request body that parsed as JSON but is missing a required field.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// A request body that is not the expected JSON.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// An [`ApiError`] paired with the status it is served with.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// A 500 response for failures outside the payroll domain.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new("INTERNAL_ERROR", message),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<PayrollError> for ApiErrorResponse {
    fn from(error: PayrollError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            PayrollError::PayPeriodNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("PAY_PERIOD_NOT_FOUND", message),
            ),
            PayrollError::EmployeeNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("EMPLOYEE_NOT_FOUND", message),
            ),
            PayrollError::AlreadyProcessed { processed_at, .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "ALREADY_PROCESSED",
                    message,
                    format!(
                        "Closed at {}; a processed pay period cannot be run again",
                        processed_at.to_rfc3339()
                    ),
                ),
            ),
            PayrollError::DuplicateRecord { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "DUPLICATE_RECORD",
                    message,
                    "The run was rolled back and the pay period is still open",
                ),
            ),
            PayrollError::DuplicateTimeEntry { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("DUPLICATE_TIME_ENTRY", message),
            ),
            PayrollError::CommitFailure { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details(
                    "COMMIT_FAILURE",
                    message,
                    "The run was rolled back and the pay period is still open",
                ),
            ),
            PayrollError::PayOverflow { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "PAY_OVERFLOW",
                    message,
                    "The run was rolled back and the pay period is still open",
                ),
            ),
            PayrollError::InvalidPayPeriod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PAY_PERIOD", message),
            ),
            PayrollError::InvalidEmployee { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_EMPLOYEE", message),
            ),
            PayrollError::InvalidTimeEntry { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_TIME_ENTRY", message),
            ),
            PayrollError::ConfigNotFound { .. }
            | PayrollError::ConfigParseError { .. }
            | PayrollError::ConfigInvalid { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            PayrollError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
        };
        Self { status, error }
    }
}
