use axum::{extract::rejection::JsonRejection, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::infrastructure::jwt::TokenError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Machine-readable error code carried in every error envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::BadRequest,
        ErrorCode::Unauthorized,
        ErrorCode::Forbidden,
        ErrorCode::NotFound,
        ErrorCode::Conflict,
        ErrorCode::Validation,
        ErrorCode::Internal,
    ];

    /// Get the HTTP status code for this error code
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Validation => "VALIDATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error types that can be rendered as error envelopes
///
/// The variant fixes the classification at construction; nothing downstream
/// re-classifies it. The `Display` output is the client-facing message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Validation failed")]
    Validation { details: Value },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn validation(details: impl Into<Value>) -> Self {
        Self::Validation { details: details.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Internal error wrapping the underlying cause, which is logged but never serialized
    pub fn internal_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Internal { message: message.into(), source: Some(source.into()) }
    }

    /// Get the classification of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest { .. } => ErrorCode::BadRequest,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Conflict { .. } => ErrorCode::Conflict,
            AppError::Validation { .. } => ErrorCode::Validation,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }

    /// Structured details, only ever present for validation failures
    pub fn details(&self) -> Option<&Value> {
        match self {
            AppError::Validation { details } => Some(details),
            _ => None,
        }
    }

    /// Check if this error should be logged as an error (vs warning)
    pub fn should_log_as_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Emit a log line for this error before it is rendered
    pub fn log(&self, request_id: &str) {
        if self.should_log_as_error() {
            match std::error::Error::source(self) {
                Some(cause) => error!(
                    request_id,
                    error_code = %self.code(),
                    cause = %cause,
                    "Application error: {}",
                    self
                ),
                None => error!(request_id, error_code = %self.code(), "Application error: {}", self),
            }
        } else {
            warn!(request_id, error_code = %self.code(), "Application warning: {}", self);
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::NotYetValid | TokenError::Invalid => {
                AppError::unauthorized("Invalid or expired token")
            }
            TokenError::Encoding(_) => AppError::internal_with_source("Failed to issue token", err),
        }
    }
}

/// Unreadable or malformed JSON request bodies
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest { message: rejection.body_text() }
    }
}

/// Anything without a classification of its own is an internal error
impl From<BoxError> for AppError {
    fn from(err: BoxError) -> Self {
        AppError::Internal { message: "Internal server error".to_string(), source: Some(err) }
    }
}
