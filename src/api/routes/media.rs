//! Media probe handlers: info, playlist, formats, presets.

use super::UrlQuery;
use crate::api::AppState;
use crate::error::{Error, Result, ValidationError};
use crate::types::{FormatList, MediaInfo, PlaylistInfo, QualityPresets};
use axum::{
    Json,
    extract::{Query, State},
};

fn required_url(query: UrlQuery) -> Result<String> {
    match query.url {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(Error::Validation(ValidationError::MissingField { field: "url" })),
    }
}

/// GET /info - Media metadata
#[utoipa::path(
    get,
    path = "/api/info",
    tag = "media",
    params(UrlQuery),
    responses(
        (status = 200, description = "Media metadata", body = MediaInfo),
        (status = 400, description = "Missing or invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Extraction tool failed", body = crate::error::ApiError)
    )
)]
pub async fn get_media_info(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<MediaInfo>> {
    let url = required_url(query)?;
    Ok(Json(state.downloader.media_info(&url).await?))
}

/// GET /info/playlist - Flat playlist listing
#[utoipa::path(
    get,
    path = "/api/info/playlist",
    tag = "media",
    params(UrlQuery),
    responses(
        (status = 200, description = "Playlist entries", body = PlaylistInfo),
        (status = 400, description = "Missing or invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Extraction tool failed", body = crate::error::ApiError)
    )
)]
pub async fn get_playlist_info(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<PlaylistInfo>> {
    let url = required_url(query)?;
    Ok(Json(state.downloader.playlist_info(&url).await?))
}

/// GET /formats - Available formats grouped by kind
#[utoipa::path(
    get,
    path = "/api/formats",
    tag = "media",
    params(UrlQuery),
    responses(
        (status = 200, description = "Available formats", body = FormatList),
        (status = 400, description = "Missing or invalid URL", body = crate::error::ApiError),
        (status = 502, description = "Extraction tool failed", body = crate::error::ApiError)
    )
)]
pub async fn get_formats(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<FormatList>> {
    let url = required_url(query)?;
    Ok(Json(state.downloader.list_formats(&url).await?))
}

/// GET /formats/quality-presets - Built-in quality presets
#[utoipa::path(
    get,
    path = "/api/formats/quality-presets",
    tag = "media",
    responses(
        (status = 200, description = "Video quality and audio format presets", body = QualityPresets)
    )
)]
pub async fn get_quality_presets(State(state): State<AppState>) -> Json<QualityPresets> {
    Json(state.downloader.quality_presets())
}
