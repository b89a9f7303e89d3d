//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Unique identifier for a download
///
/// Issued from a monotonic counter owned by the [`DownloadRegistry`](crate::registry::DownloadRegistry),
/// so two requests accepted by the same process never share an id.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct DownloadId(pub u64);

impl DownloadId {
    /// Create a new DownloadId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DownloadId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<DownloadId> for u64 {
    fn from(id: DownloadId) -> Self {
        id.0
    }
}

impl PartialEq<u64> for DownloadId {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DownloadId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Download status
///
/// Transitions only move forward:
/// `Starting → Downloading → {Completed, Errored}` or `Starting → Errored`
/// (`Starting → Completed` is also allowed when the tool exits 0 without
/// ever reporting progress).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Accepted, subprocess not yet confirmed running
    Starting,
    /// At least one progress report seen
    Downloading,
    /// Tool exited with code 0
    Completed,
    /// Tool failed to launch, exited non-zero, wrote to stderr, or was cancelled
    #[serde(rename = "error")]
    Errored,
}

impl Status {
    /// Whether no further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Errored)
    }

    /// Wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Starting => "starting",
            Status::Downloading => "downloading",
            Status::Completed => "completed",
            Status::Errored => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one download's canonical state
///
/// Observers and registry queries always receive clones of this struct.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DownloadState {
    /// Unique download identifier
    pub id: DownloadId,

    /// Source URL (copy of the request URL)
    pub url: String,

    /// Current status
    pub status: Status,

    /// Progress percentage (0.0 to 100.0)
    pub progress: f64,

    /// Output file name (basename only, empty until the tool reports it)
    pub filename: String,

    /// Last error text, set only on transition to `Errored`
    pub error: Option<String>,
}

impl DownloadState {
    /// Initial state for a freshly accepted request
    pub fn starting(id: DownloadId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            status: Status::Starting,
            progress: 0.0,
            filename: String::new(),
            error: None,
        }
    }
}

/// Download request as submitted by a client
///
/// Field names follow the JSON body accepted by `POST /api/download`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    /// Media page URL (http or https)
    #[serde(default)]
    pub url: String,

    /// Extract audio only
    #[serde(default)]
    pub audio_only: bool,

    /// Target audio format (required when `audioOnly` is true), e.g. "mp3"
    #[serde(default)]
    pub format: Option<String>,

    /// Target video quality (required when `audioOnly` is false), e.g. "720" or "best"
    #[serde(default)]
    pub quality: Option<String>,
}

/// What the extraction tool is asked to produce
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaSelection {
    /// Audio extraction into the given format
    Audio {
        /// Target audio format
        format: String,
    },
    /// Video capped at the given quality
    Video {
        /// Target quality ("best" or a maximum height)
        quality: String,
    },
}

/// A request that passed validation; immutable from here on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRequest {
    url: String,
    selection: MediaSelection,
}

impl ValidatedRequest {
    /// Source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Audio/video selection
    pub fn selection(&self) -> &MediaSelection {
        &self.selection
    }
}

impl DownloadRequest {
    /// Build an audio-only request
    pub fn audio(url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            audio_only: true,
            format: Some(format.into()),
            quality: None,
        }
    }

    /// Build a video request
    pub fn video(url: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            audio_only: false,
            format: None,
            quality: Some(quality.into()),
        }
    }

    /// Validate the request
    ///
    /// Rejects URLs whose scheme is not http/https, and requires `format` for
    /// audio-only requests and `quality` otherwise.
    pub fn validate(self) -> Result<ValidatedRequest, ValidationError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingField { field: "url" });
        }
        validate_url(url)?;

        let selection = if self.audio_only {
            MediaSelection::Audio {
                format: required(self.format, "format")?,
            }
        } else {
            MediaSelection::Video {
                quality: required(self.quality, "quality")?,
            }
        };

        Ok(ValidatedRequest {
            url: url.to_string(),
            selection,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField { field }),
    }
}

/// Check that `url` is an absolute http(s) URL with a host
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = url::Url::parse(url).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        _ => Err(invalid()),
    }
}

/// Event published on every state transition
///
/// Download events carry a full [`DownloadState`] snapshot. The serialized
/// form is the snapshot plus a `type` tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Request accepted, state is `Starting`
    DownloadStart(DownloadState),
    /// Progress changed (state is `Downloading`)
    DownloadProgress(DownloadState),
    /// Terminal: tool exited 0
    DownloadComplete(DownloadState),
    /// Terminal: launch failure, non-zero exit, stderr output or cancellation
    DownloadError(DownloadState),
    /// Graceful shutdown initiated
    Shutdown,
}

impl Event {
    /// Build the event matching the status of `state`
    pub fn for_state(state: DownloadState) -> Self {
        match state.status {
            Status::Starting => Event::DownloadStart(state),
            Status::Downloading => Event::DownloadProgress(state),
            Status::Completed => Event::DownloadComplete(state),
            Status::Errored => Event::DownloadError(state),
        }
    }

    /// Snapshot carried by the event, if any
    pub fn state(&self) -> Option<&DownloadState> {
        match self {
            Event::DownloadStart(s)
            | Event::DownloadProgress(s)
            | Event::DownloadComplete(s)
            | Event::DownloadError(s) => Some(s),
            Event::Shutdown => None,
        }
    }

    /// Download the event belongs to, if any
    pub fn download_id(&self) -> Option<DownloadId> {
        self.state().map(|s| s.id)
    }

    /// Whether this event reports a terminal transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::DownloadComplete(_) | Event::DownloadError(_))
    }

    /// Event name used on the SSE stream
    pub fn name(&self) -> &'static str {
        match self {
            Event::DownloadStart(_) => "download-start",
            Event::DownloadProgress(_) => "download-progress",
            Event::DownloadComplete(_) => "download-complete",
            Event::DownloadError(_) => "download-error",
            Event::Shutdown => "shutdown",
        }
    }
}

/// A file in the download directory
///
/// Rebuilt from file-system metadata on every listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Creation time (modification time where the platform has no birth time)
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

// ----------------------------------------------------------------------------
// Media probes
// ----------------------------------------------------------------------------

/// Media metadata reported by `--dump-json`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MediaInfo {
    /// Extractor-specific media id
    pub id: Option<String>,
    /// Title
    pub title: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Uploader name
    pub uploader: Option<String>,
    /// Upload date (YYYYMMDD)
    pub upload_date: Option<String>,
    /// View count
    pub view_count: Option<u64>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Canonical page URL
    pub webpage_url: Option<String>,
    /// Extractor name
    pub extractor: Option<String>,
    /// Available formats
    pub formats: Vec<MediaFormat>,
}

/// One format entry of [`MediaInfo`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct MediaFormat {
    /// Format id (usable with `-f`)
    pub format_id: Option<String>,
    /// Container extension
    pub ext: Option<String>,
    /// Relative quality score
    pub quality: Option<f64>,
    /// File size in bytes, if known
    pub filesize: Option<u64>,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
    /// Frames per second
    pub fps: Option<f64>,
    /// Video codec ("none" for audio-only)
    pub vcodec: Option<String>,
    /// Audio codec ("none" for video-only)
    pub acodec: Option<String>,
    /// Human readable note
    pub format_note: Option<String>,
}

/// Flat playlist listing
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlaylistInfo {
    /// Playlist entries in order
    pub entries: Vec<PlaylistEntry>,
}

/// One entry of a flat playlist listing
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PlaylistEntry {
    /// Entry id
    pub id: Option<String>,
    /// Entry title
    pub title: Option<String>,
    /// Entry URL
    pub url: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Uploader name
    pub uploader: Option<String>,
}

/// Whether a listed format is audio or video
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// Audio format
    Audio,
    /// Video (or muxed) format
    Video,
}

/// One row of the `--list-formats` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormatEntry {
    /// Format code
    pub format_code: String,
    /// Container extension
    pub extension: String,
    /// Resolution column ("audio only" rows report "audio")
    pub resolution: String,
    /// Remaining columns joined by single spaces
    pub note: String,
    /// Audio or video
    #[serde(rename = "type")]
    pub kind: FormatKind,
}

/// Formats grouped by kind
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormatList {
    /// Video formats
    pub video_formats: Vec<FormatEntry>,
    /// Audio formats
    pub audio_formats: Vec<FormatEntry>,
    /// All formats in table order
    pub all_formats: Vec<FormatEntry>,
}

/// A selectable quality or format preset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QualityPreset {
    /// Value to submit as `quality` or `format`
    pub value: String,
    /// Display label
    pub label: String,
    /// Longer description
    pub description: String,
}

/// Preset lists for video quality and audio format selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QualityPresets {
    /// Video quality presets
    pub video: Vec<QualityPreset>,
    /// Audio format presets
    pub audio: Vec<QualityPreset>,
}

impl QualityPresets {
    /// The built-in preset lists
    pub fn builtin() -> Self {
        fn preset(value: &str, label: &str, description: &str) -> QualityPreset {
            QualityPreset {
                value: value.to_string(),
                label: label.to_string(),
                description: description.to_string(),
            }
        }

        Self {
            video: vec![
                preset("2160", "4K (2160p)", "Ultra High Definition"),
                preset("1440", "2K (1440p)", "Quad HD"),
                preset("1080", "Full HD (1080p)", "High Definition"),
                preset("720", "HD (720p)", "High Definition"),
                preset("480", "SD (480p)", "Standard Definition"),
                preset("360", "Low (360p)", "Low Quality"),
                preset("best", "Best Available", "Highest quality available"),
                preset("worst", "Worst Available", "Lowest quality available"),
            ],
            audio: vec![
                preset("mp3", "MP3", "Standard audio format"),
                preset("m4a", "M4A", "High quality audio"),
                preset("wav", "WAV", "Uncompressed audio"),
                preset("flac", "FLAC", "Lossless audio"),
                preset("ogg", "OGG", "Open source audio"),
                preset("best", "Best Available", "Highest quality available"),
            ],
        }
    }
}
