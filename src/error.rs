//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (validation, stored files, download control)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Download request rejected before any subprocess was started
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Stored file operation failed
    #[error("file error: {0}")]
    File(#[from] FileError),

    /// Download control error (cancel on a finished download, unknown id)
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External extraction tool failed (missing binary, non-zero exit on a probe)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Request validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// URL is missing, malformed, or uses a scheme other than http/https
    #[error("invalid URL format: {url:?} (expected an http:// or https:// URL)")]
    InvalidUrl {
        /// The rejected URL
        url: String,
    },

    /// A field required for this kind of request is missing or blank
    #[error("{field} is required")]
    MissingField {
        /// Name of the missing field (e.g., "format")
        field: &'static str,
    },
}

/// Errors from the file store
#[derive(Debug, Error)]
pub enum FileError {
    /// No such file in the download directory
    #[error("file {name} not found")]
    NotFound {
        /// Requested file name
        name: String,
    },

    /// Requested name resolves outside the download directory
    #[error("invalid file path {name:?}: resolves outside the download directory")]
    PathTraversal {
        /// Requested (raw) file name
        name: String,
    },
}

/// Download control errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Download not found in the registry
    #[error("download {id} not found")]
    NotFound {
        /// The download ID that was not found
        id: u64,
    },

    /// Cannot perform operation in current state
    #[error("cannot {operation} download {id} in state {current_state}")]
    InvalidState {
        /// The download ID
        id: u64,
        /// The operation that was attempted (e.g., "cancel")
        operation: String,
        /// The current state that prevents the operation
        current_state: String,
    },
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "download_not_found",
///     "message": "download error: download 7 not found",
///     "details": { "download_id": 7 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_url")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,
            Error::File(FileError::PathTraversal { .. }) => 400,

            Error::File(FileError::NotFound { .. }) => 404,
            Error::Download(DownloadError::NotFound { .. }) => 404,

            Error::Download(DownloadError::InvalidState { .. }) => 409,

            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            Error::ExternalTool(_) => 502,

            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(e) => match e {
                ValidationError::InvalidUrl { .. } => "invalid_url",
                ValidationError::MissingField { .. } => "missing_field",
            },
            Error::File(e) => match e {
                FileError::NotFound { .. } => "file_not_found",
                FileError::PathTraversal { .. } => "invalid_path",
            },
            Error::Download(e) => match e {
                DownloadError::NotFound { .. } => "download_not_found",
                DownloadError::InvalidState { .. } => "invalid_state",
            },
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::ShuttingDown => "shutting_down",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Validation(ValidationError::MissingField { field }) => {
                Some(serde_json::json!({ "field": field }))
            }
            Error::Validation(ValidationError::InvalidUrl { url }) => {
                Some(serde_json::json!({ "url": url }))
            }
            Error::File(FileError::NotFound { name }) => Some(serde_json::json!({ "name": name })),
            Error::Download(DownloadError::NotFound { id }) => {
                Some(serde_json::json!({ "download_id": id }))
            }
            Error::Download(DownloadError::InvalidState {
                id,
                operation,
                current_state,
            }) => Some(serde_json::json!({
                "download_id": id,
                "operation": operation,
                "current_state": current_state,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
