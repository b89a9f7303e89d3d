//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Download behavior configuration (output location, tool flags, concurrency)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Output file name template passed to the tool (default: "%(title)s.%(ext)s")
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Download only the single video when a URL points into a playlist (default: true)
    #[serde(default = "default_true")]
    pub no_playlist: bool,

    /// User agent sent by the tool (None = tool default)
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Extra HTTP headers, each in the tool's `Name:Value` form
    #[serde(default = "default_extra_headers")]
    pub extra_headers: Vec<String>,

    /// Maximum concurrently running subprocesses (0 = unlimited)
    ///
    /// Downloads waiting for a slot stay in `Starting`.
    #[serde(default)]
    pub max_concurrent_downloads: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            output_template: default_output_template(),
            no_playlist: true,
            user_agent: default_user_agent(),
            extra_headers: default_extra_headers(),
            max_concurrent_downloads: 0,
        }
    }
}

/// External tool location
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Event fan-out configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EventConfig {
    /// Per-observer backlog (default: 1000)
    ///
    /// An observer that falls further behind than this is disconnected.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Main configuration for MediaDownloader
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Event fan-out settings
    #[serde(default)]
    pub events: EventConfig,

    /// API server settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load a JSON configuration file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.events.channel_capacity == 0 {
            return Err(Error::Config {
                message: "event channel capacity must be at least 1".to_string(),
                key: Some("events.channel_capacity".to_string()),
            });
        }
        if self.download.output_template.trim().is_empty() {
            return Err(Error::Config {
                message: "output template must not be empty".to_string(),
                key: Some("download.output_template".to_string()),
            });
        }
        Ok(())
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_output_template() -> String {
    "%(title)s.%(ext)s".to_string()
}

fn default_user_agent() -> Option<String> {
    Some(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.124 Safari/537.36"
            .to_string(),
    )
}

fn default_extra_headers() -> Vec<String> {
    vec!["Accept-Language:en-US,en;q=0.9".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    1000
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
