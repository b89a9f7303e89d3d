//! Argument vectors for the extraction tool

use crate::config::DownloadConfig;
use crate::types::{MediaSelection, ValidatedRequest};

/// Arguments for a download run
///
/// Layout: request headers, format selection, output template, playlist and
/// progress flags, then the URL last.
pub(crate) fn build_download_args(config: &DownloadConfig, request: &ValidatedRequest) -> Vec<String> {
    let mut args = header_args(config);

    match request.selection() {
        MediaSelection::Audio { format } => {
            args.extend([
                "-f".to_string(),
                "bestaudio/best".to_string(),
                "--extract-audio".to_string(),
                "--audio-format".to_string(),
                format.clone(),
            ]);
        }
        MediaSelection::Video { quality } if quality != "best" => {
            args.extend(["-f".to_string(), format!("best[height<={quality}]/best")]);
        }
        MediaSelection::Video { .. } => {
            args.extend(["-f".to_string(), "b".to_string()]);
        }
    }

    let output = config.download_dir.join(&config.output_template);
    args.extend(["-o".to_string(), output.to_string_lossy().into_owned()]);

    if config.no_playlist {
        args.push("--no-playlist".to_string());
    }
    args.extend(["--progress".to_string(), "--newline".to_string()]);
    args.push(request.url().to_string());
    args
}

/// Arguments for the single-media metadata probe
pub(crate) fn info_args(config: &DownloadConfig, url: &str) -> Vec<String> {
    let mut args = header_args(config);
    args.extend([
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        url.to_string(),
    ]);
    args
}

/// Arguments for the flat playlist probe
pub(crate) fn playlist_args(config: &DownloadConfig, url: &str) -> Vec<String> {
    let mut args = header_args(config);
    args.extend([
        "--flat-playlist".to_string(),
        "--dump-json".to_string(),
        url.to_string(),
    ]);
    args
}

/// Arguments for the format table probe
pub(crate) fn formats_args(config: &DownloadConfig, url: &str) -> Vec<String> {
    let mut args = header_args(config);
    args.extend([
        "--list-formats".to_string(),
        "--no-playlist".to_string(),
        url.to_string(),
    ]);
    args
}

fn header_args(config: &DownloadConfig) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(user_agent) = &config.user_agent {
        args.extend(["--user-agent".to_string(), user_agent.clone()]);
    }
    for header in &config.extra_headers {
        args.extend(["--add-header".to_string(), header.clone()]);
    }
    args
}
