// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A single field-level problem reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Error not tied to a particular input field.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new("general", message)
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Reset token is invalid or expired")]
    InvalidResetToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a validation failure on one field.
    pub fn invalid_field(path: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(path, message)])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidResetToken => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    error: &'static str,
    errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, errors) = match self {
            AppError::Validation(errors) => ("validation_error", errors),
            AppError::BadRequest(msg) => ("bad_request", vec![FieldError::general(msg)]),
            AppError::Unauthorized => (
                "unauthorized",
                vec![FieldError::general("Authentication required")],
            ),
            AppError::NotFound(msg) => ("not_found", vec![FieldError::general(msg)]),
            AppError::Conflict(msg) => ("conflict", vec![FieldError::general(msg)]),
            AppError::InvalidResetToken => (
                "invalid_reset_token",
                vec![FieldError::general("Reset token is invalid or expired")],
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    "database_error",
                    vec![FieldError::general("Internal server error")],
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    "internal_error",
                    vec![FieldError::general("Internal server error")],
                )
            }
        };

        let body = ErrorResponse {
            status: "error",
            error,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
