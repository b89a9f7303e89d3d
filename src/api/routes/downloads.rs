//! Download submission, registry and cancellation handlers.

use super::SubmitDownloadResponse;
use crate::api::AppState;
use crate::error::Result;
use crate::types::{DownloadId, DownloadRequest, DownloadState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

/// POST /download - Start a download
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Download accepted", body = SubmitDownloadResponse),
        (status = 400, description = "Invalid URL or missing format/quality", body = crate::error::ApiError),
        (status = 503, description = "Server is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn submit_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<SubmitDownloadResponse>> {
    let download_id = state.downloader.submit(request).await?;

    Ok(Json(SubmitDownloadResponse {
        success: true,
        download_id,
        message: "Download started".to_string(),
    }))
}

/// GET /downloads - Current state of every download
#[utoipa::path(
    get,
    path = "/api/downloads",
    tag = "downloads",
    responses(
        (status = 200, description = "All downloads known to this process", body = Vec<DownloadState>)
    )
)]
pub async fn list_downloads(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.downloader.list_downloads().await))
}

/// GET /downloads/:id - Current state of one download
#[utoipa::path(
    get,
    path = "/api/downloads/{id}",
    tag = "downloads",
    params(
        ("id" = u64, Path, description = "Download ID")
    ),
    responses(
        (status = 200, description = "Download state", body = DownloadState),
        (status = 404, description = "Download not found", body = crate::error::ApiError)
    )
)]
pub async fn get_download(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DownloadState>> {
    Ok(Json(state.downloader.get_download(DownloadId(id)).await?))
}

/// POST /downloads/:id/cancel - Cancel a running download
#[utoipa::path(
    post,
    path = "/api/downloads/{id}/cancel",
    tag = "downloads",
    params(
        ("id" = u64, Path, description = "Download ID")
    ),
    responses(
        (status = 204, description = "Cancellation requested"),
        (status = 404, description = "Download not found", body = crate::error::ApiError),
        (status = 409, description = "Download already finished", body = crate::error::ApiError)
    )
)]
pub async fn cancel_download(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    state.downloader.cancel(DownloadId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
