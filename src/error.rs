//! Application error type and its HTTP translation.
//!
//! Every per-request failure is an [`AppError`]. Its [`ErrorKind`] decides what the
//! request boundary does with it: answer 404, answer 500, or bring the process down.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Client-facing part of an error.
///
/// Only the code and a human readable message; `details` stay in the logs.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
}

/// Severity of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown short id, malformed short id, missing template.
    NotFound,
    /// A single request failed (store error, unparsable shorten payload, hook failure).
    Operational,
    /// The service cannot work as configured; the process must stop.
    Fatal,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Operational { message: String, details: Value },
    #[error("{message}")]
    Fatal { message: String, details: Value },
}

impl AppError {
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn operational(message: impl Into<String>, details: Value) -> Self {
        Self::Operational {
            message: message.into(),
            details,
        }
    }
    pub fn fatal(message: impl Into<String>, details: Value) -> Self {
        Self::Fatal {
            message: message.into(),
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Operational { .. } => ErrorKind::Operational,
            AppError::Fatal { .. } => ErrorKind::Fatal,
        }
    }

    /// Internal context attached to the error, for logging only.
    pub fn details(&self) -> &Value {
        match self {
            AppError::NotFound { details, .. }
            | AppError::Operational { details, .. }
            | AppError::Fatal { details, .. } => details,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Operational | ErrorKind::Fatal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let code = match self.kind() {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Operational => "internal_error",
            ErrorKind::Fatal => "service_unavailable",
        };
        ErrorInfo {
            code,
            message: self.to_string(),
        }
    }
}

impl AppError {
    /// Builds the HTTP response without consuming the error, so hooks can still see it.
    pub fn to_response(&self) -> Response {
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

/// Maps a store error to an operational error without leaking its text to clients.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    let constraint = e
        .as_database_error()
        .and_then(|db| db.constraint().map(str::to_owned));

    AppError::operational(
        "Database error",
        json!({ "reason": e.to_string(), "constraint": constraint }),
    )
}
