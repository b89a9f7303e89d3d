//! # media-dl
//!
//! Download orchestration core for a media downloader built around `yt-dlp`.
//!
//! Each accepted request runs the extraction tool as a subprocess. Its
//! line-oriented output is parsed into progress, file name and error events
//! that drive a per-download state machine, and every state transition is
//! broadcast to any number of observers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, DownloadRequest, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default()).await?;
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{}: {:?}", event.name(), event.state());
//!         }
//!     });
//!
//!     let id = downloader
//!         .submit(DownloadRequest::audio("https://example.com/watch?v=abc", "mp3"))
//!         .await?;
//!     println!("accepted download {id}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Download orchestrator
pub mod downloader;
/// Error types
pub mod error;
/// Event fan-out to observers
pub mod events;
/// Download directory listing and guarded deletion
pub mod file_store;
/// Extraction tool output parsing
pub mod parser;
/// Subprocess launching and output streaming
pub mod process;
/// Registry of every download accepted by this process
pub mod registry;
/// Per-download state machine
pub mod state_machine;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config};
pub use downloader::MediaDownloader;
pub use error::{
    ApiError, DownloadError, Error, ErrorDetail, FileError, Result, ToHttpStatus, ValidationError,
};
pub use events::{EventBroadcaster, Subscription, SubscriptionError};
pub use parser::{OutputParser, ParsedEvent, YtDlpOutputParser};
pub use process::{CliProcessLauncher, ProcessExit, ProcessHandle, ProcessLauncher};
pub use types::{DownloadId, DownloadRequest, DownloadState, Event, Status, StoredFile};

/// Run until a termination signal arrives, then shut the downloader down.
///
/// - **Unix:** listens for SIGTERM and SIGINT.
/// - **Other platforms:** listens for Ctrl+C.
///
/// ```no_run
/// use media_dl::{Config, MediaDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = MediaDownloader::new(Config::default()).await?;
///     run_with_shutdown(downloader).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: MediaDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                _ = sigint.recv() => tracing::info!("Received SIGINT"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
