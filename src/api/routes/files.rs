//! Stored file handlers.

use super::DeleteFileResponse;
use crate::api::AppState;
use crate::error::Result;
use crate::types::StoredFile;
use axum::{
    Json,
    extract::{Path, State},
};

/// GET /download/list - Files in the download directory
#[utoipa::path(
    get,
    path = "/api/download/list",
    tag = "files",
    responses(
        (status = 200, description = "Stored files sorted by name", body = Vec<StoredFile>),
        (status = 500, description = "Directory could not be read", body = crate::error::ApiError)
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<StoredFile>>> {
    Ok(Json(state.downloader.list_files().await?))
}

/// DELETE /download/:filename - Delete a stored file
#[utoipa::path(
    delete,
    path = "/api/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name (URL-encoded)")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteFileResponse),
        (status = 400, description = "Name resolves outside the download directory", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteFileResponse>> {
    state.downloader.delete_file(&filename).await?;

    Ok(Json(DeleteFileResponse {
        success: true,
        message: "File deleted successfully".to_string(),
    }))
}
