//! OpenAPI document for the media-dl REST API, generated at compile time by utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// Served at `/api/openapi.json`, and at `/api-docs/openapi.json` for `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "Submit media URLs for download, follow their progress live, and manage the stored files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::submit_download,
        crate::api::routes::list_downloads,
        crate::api::routes::get_download,
        crate::api::routes::cancel_download,

        // Files
        crate::api::routes::list_files,
        crate::api::routes::delete_file,

        // Media
        crate::api::routes::get_media_info,
        crate::api::routes::get_playlist_info,
        crate::api::routes::get_formats,
        crate::api::routes::get_quality_presets,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::DownloadId,
        crate::types::Status,
        crate::types::DownloadState,
        crate::types::DownloadRequest,
        crate::types::StoredFile,
        crate::types::MediaInfo,
        crate::types::MediaFormat,
        crate::types::PlaylistInfo,
        crate::types::PlaylistEntry,
        crate::types::FormatKind,
        crate::types::FormatEntry,
        crate::types::FormatList,
        crate::types::QualityPreset,
        crate::types::QualityPresets,

        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::ToolsConfig,
        crate::config::EventConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,

        crate::api::routes::SubmitDownloadResponse,
        crate::api::routes::DeleteFileResponse,

        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Start downloads, follow the registry, cancel running downloads"),
        (name = "files", description = "Files stored in the download directory"),
        (name = "media", description = "Metadata, playlist and format probes"),
        (name = "system", description = "Health check, OpenAPI document, live event stream"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `X-Api-Key` header scheme
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
