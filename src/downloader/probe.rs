//! Metadata, playlist and format queries that run the tool to completion.

use crate::error::{Error, Result};
use crate::process::CollectedOutput;
use crate::types::{
    FormatEntry, FormatKind, FormatList, MediaInfo, PlaylistEntry, PlaylistInfo, QualityPresets,
    validate_url,
};

use super::MediaDownloader;
use super::args::{formats_args, info_args, playlist_args};

/// Extensions treated as audio in the format table
const AUDIO_EXTENSIONS: [&str; 4] = ["m4a", "mp3", "wav", "ogg"];

impl MediaDownloader {
    /// Metadata for a single media URL
    pub async fn media_info(&self, url: &str) -> Result<MediaInfo> {
        validate_url(url)?;
        let output = self.run_probe("info", info_args(&self.config.download, url)).await?;

        serde_json::from_str(output.stdout.join("\n").trim()).map_err(|e| {
            Error::ExternalTool(format!("failed to parse media information: {e}"))
        })
    }

    /// Flat listing of a playlist's entries
    pub async fn playlist_info(&self, url: &str) -> Result<PlaylistInfo> {
        validate_url(url)?;
        let output = self
            .run_probe("playlist", playlist_args(&self.config.download, url))
            .await?;

        let entries = output
            .stdout
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<PlaylistEntry>(line))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::ExternalTool(format!("failed to parse playlist information: {e}")))?;

        Ok(PlaylistInfo { entries })
    }

    /// Available formats for a media URL, grouped by kind
    pub async fn list_formats(&self, url: &str) -> Result<FormatList> {
        validate_url(url)?;
        let output = self
            .run_probe("formats", formats_args(&self.config.download, url))
            .await?;
        Ok(parse_format_table(&output.stdout))
    }

    /// Built-in quality and audio format presets
    pub fn quality_presets(&self) -> QualityPresets {
        QualityPresets::builtin()
    }

    /// Run the tool to completion; anything but exit 0 is an error
    ///
    /// The tool is killed when the downloader shuts down, which yields
    /// [`Error::ShuttingDown`].
    async fn run_probe(&self, kind: &'static str, args: Vec<String>) -> Result<CollectedOutput> {
        tracing::debug!(probe = kind, args = ?args, "running probe");
        let cancel = self.runtime.shutdown.child_token();
        let output = self
            .tooling
            .launcher
            .start(&args, cancel.clone())
            .await
            .collect()
            .await;

        if output.exit.is_success() {
            return Ok(output);
        }
        if cancel.is_cancelled() {
            tracing::debug!(probe = kind, "probe stopped by shutdown");
            return Err(Error::ShuttingDown);
        }

        let details = if output.stderr.is_empty() {
            format!("{:?}", output.exit)
        } else {
            output.stderr.join("\n")
        };
        tracing::warn!(probe = kind, error = %details, "probe failed");
        Err(Error::ExternalTool(format!("failed to get {kind} information: {details}")))
    }
}

/// Parse the table printed by `--list-formats`
///
/// Rows start after the header line and are split on whitespace; rows with
/// fewer than three columns and separator lines are skipped.
pub(crate) fn parse_format_table(lines: &[String]) -> FormatList {
    let mut all_formats = Vec::new();
    let mut in_table = false;

    for line in lines {
        if !in_table {
            in_table = is_header(line);
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| matches!(c, '-' | '─' | ' ')) {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let extension = parts[1].to_string();
        let resolution = parts[2].to_string();
        // Kind follows the extension only; the resolution column is ignored
        let kind = if AUDIO_EXTENSIONS.iter().any(|ext| extension.contains(ext)) {
            FormatKind::Audio
        } else {
            FormatKind::Video
        };

        all_formats.push(FormatEntry {
            format_code: parts[0].to_string(),
            extension,
            resolution,
            note: parts[3..].join(" "),
            kind,
        });
    }

    let (audio_formats, video_formats) = all_formats
        .iter()
        .cloned()
        .partition(|f| f.kind == FormatKind::Audio);

    FormatList {
        video_formats,
        audio_formats,
        all_formats,
    }
}

fn is_header(line: &str) -> bool {
    (line.contains("format code") && line.contains("extension"))
        || (line.contains("ID") && line.contains("EXT"))
}
