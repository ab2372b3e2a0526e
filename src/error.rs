//! Unified application error model and mapping helpers.
//! This module provides a common error enum used across the HTTP handlers and
//! the credential gate, along with the mapping to status codes and JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::{Display, Formatter};

/// A single failed input field, surfaced inside a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<S: Into<String>>(field: S, message: S) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Malformed or missing input; carries every failing field, not just the first.
    Validation { code: String, message: String, fields: Vec<FieldError> },
    /// Duplicate unique key, e.g. an email that is already registered.
    Conflict { code: String, message: String },
    /// Missing, malformed, expired or unverifiable credentials. The message is
    /// deliberately generic and identical across causes.
    Auth { code: String, message: String },
    /// Authenticated but not permitted for the route.
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    /// Unexpected failure. Full detail is logged server-side; the message here
    /// is the opaque one that crosses the boundary.
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        AppError::Validation {
            code: "invalid_input".into(),
            message: "one or more fields failed validation".into(),
            fields,
        }
    }

    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self {
        AppError::Conflict { code: code.into(), message: msg.into() }
    }

    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self {
        AppError::Auth { code: code.into(), message: msg.into() }
    }

    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self {
        AppError::Forbidden { code: code.into(), message: msg.into() }
    }

    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self {
        AppError::NotFound { code: code.into(), message: msg.into() }
    }

    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self {
        AppError::Internal { code: code.into(), message: msg.into() }
    }

    /// The one body returned for any credential mismatch. Wrong password and
    /// unknown email must be indistinguishable to the caller.
    pub fn invalid_credentials() -> Self {
        AppError::auth("invalid_credentials", "invalid email or password")
    }

    /// The one body returned for any missing/unverifiable session token.
    pub fn unauthenticated() -> Self {
        AppError::auth("unauthenticated", "authentication required")
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Auth { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = match &self {
            AppError::Validation { code, message, fields } => json!({
                "status": "error",
                "code": code,
                "message": message,
                "fields": fields,
            }),
            other => json!({
                "status": "error",
                "code": other.code_str(),
                "message": other.message(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
