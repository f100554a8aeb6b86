//! Error types and handling for the WerTigo service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::RecordKind;

/// Main error type for the WerTigo service
#[derive(Error, Debug)]
pub enum WertigoError {
    /// A city or place id that is not in the catalog
    #[error("{} not found: {id}", .kind.as_str())]
    NotFound { kind: RecordKind, id: String },

    /// A chat session id that is unknown or was discarded
    #[error("chat session not found: {id}")]
    SessionNotFound { id: String },

    /// Catalog data that violates its invariants
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Catalog documents that are not valid JSON
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl WertigoError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(kind: RecordKind, id: S) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a new session-not-found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            WertigoError::NotFound { .. } => "not_found",
            WertigoError::SessionNotFound { .. } => "session_not_found",
            WertigoError::Catalog { .. } => "catalog",
            WertigoError::Config { .. } => "config",
            WertigoError::Validation { .. } => "invalid_input",
            WertigoError::Io { .. } => "io",
            WertigoError::Json { .. } => "json",
            WertigoError::General { .. } => "internal",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            WertigoError::NotFound { .. } | WertigoError::SessionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            WertigoError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WertigoError::NotFound { kind, .. } => match kind {
                RecordKind::City => "We couldn't find that city.".to_string(),
                RecordKind::Place => "We couldn't find that place.".to_string(),
            },
            WertigoError::SessionNotFound { .. } => {
                "This chat session has ended. Please start a new conversation.".to_string()
            }
            WertigoError::Catalog { .. } => {
                "The travel catalog could not be loaded. Please check the catalog file.".to_string()
            }
            WertigoError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WertigoError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WertigoError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            WertigoError::Json { .. } => "Malformed JSON document.".to_string(),
            WertigoError::General { message } => message.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for WertigoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}
