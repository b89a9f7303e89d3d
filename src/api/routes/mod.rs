//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] — Download submission, registry queries, cancellation
//! - [`files`] — Stored file listing and deletion
//! - [`media`] — Metadata, playlist and format probes
//! - [`system`] — Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod downloads;
mod files;
mod media;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use downloads::*;
pub use files::*;
pub use media::*;
pub use system::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for the probe endpoints
#[derive(Debug, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UrlQuery {
    /// Media or playlist URL (http/https)
    pub url: Option<String>,
}

/// Query parameters for GET /events
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventStreamQuery {
    /// Only stream events for this download
    pub download_id: Option<u64>,
}

/// Response for POST /download
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDownloadResponse {
    /// Always true on success
    pub success: bool,
    /// Identifier of the accepted download
    pub download_id: crate::types::DownloadId,
    /// Human-readable status
    pub message: String,
}

/// Response for DELETE /download/:filename
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteFileResponse {
    /// Always true on success
    pub success: bool,
    /// Human-readable status
    pub message: String,
}
