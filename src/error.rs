// src/error.rs

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::gateway::GatewayError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (missing or blank input)
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (superseded request, quiz in the wrong state)
    Conflict(String),

    // 500, upstream model call failed or returned a non-success status
    Gateway(String),

    // 500, upstream model call did not answer in time
    GatewayTimeout,

    // 500, model text was not valid JSON or lacked required fields.
    // `raw` is logged, never returned.
    MalformedResponse { reason: String, raw: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        AppError::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Gateway(msg) => {
                tracing::error!("Gateway error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The generation service failed. Please try again.".to_string(),
                )
            }
            AppError::GatewayTimeout => {
                tracing::error!("Gateway timed out");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The generation service timed out. Please try again.".to_string(),
                )
            }
            AppError::MalformedResponse { reason, raw } => {
                tracing::error!(%reason, %raw, "Malformed gateway response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The generation service returned an unusable response.".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

/// Body that could not be read as the expected JSON shape.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout => AppError::GatewayTimeout,
            other => AppError::Gateway(other.to_string()),
        }
    }
}

/// Surfaces the first human-readable validation message, falling back to the
/// validator's own rendering when no field carries one.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        AppError::BadRequest(message)
    }
}
