//! Unified API error rendering
//!
//! Every handler returns `ApiError` on failure; all errors are rendered as
//! a JSON envelope `{"error": {"code", "message", "details?"}}` with a
//! matching HTTP status code. Internal failures are logged and masked.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::errors::EventlyError;

/// The inner error object in the response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-keyed validation violations, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// The full error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// API error carrying the status and envelope to render
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Unauthorized error (401) - authentication required
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Authentication required")
    }

    /// Bad request error (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }
}

impl From<EventlyError> for ApiError {
    fn from(err: EventlyError) -> Self {
        match err {
            EventlyError::Validation(errors) => {
                let mut api = ApiError::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation_error",
                    "Validation failed",
                );
                api.details = Some(errors.fields().clone());
                api
            }
            EventlyError::Unauthorized => ApiError::unauthorized(),
            EventlyError::Forbidden(message) => {
                ApiError::new(StatusCode::FORBIDDEN, "forbidden", message)
            }
            EventlyError::DuplicateRegistration => ApiError::new(
                StatusCode::CONFLICT,
                "duplicate_registration",
                "Already registered for this event",
            ),
            EventlyError::RegistrationClosed(reason) => ApiError::new(
                StatusCode::CONFLICT,
                "registration_closed",
                format!("Registration closed: {}", reason),
            ),
            EventlyError::Conflict(message) => {
                ApiError::new(StatusCode::CONFLICT, "conflict", message)
            }
            EventlyError::NotFound { resource, id } => ApiError::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} {} not found", resource, id),
            ),
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = ErrorResponse {
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
