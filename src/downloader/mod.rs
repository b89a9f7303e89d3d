//! Download orchestration service split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`control`] - Request intake and cancellation
//! - [`task`] - Per-download subprocess supervision
//! - [`probe`] - Metadata, playlist and format queries
//! - [`lifecycle`] - Shutdown coordination
//! - [`args`] - Tool argument assembly

mod args;
mod control;
mod lifecycle;
mod probe;
mod task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{EventBroadcaster, Subscription};
use crate::file_store::FileStore;
use crate::parser::{OutputParser, YtDlpOutputParser};
use crate::process::{CliProcessLauncher, ProcessLauncher};
use crate::registry::DownloadRegistry;
use crate::types::{DownloadId, DownloadState, StoredFile};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;

/// External tool access: how to start it and how to read it
#[derive(Clone)]
pub(crate) struct Tooling {
    /// Starts extraction tool processes
    pub(crate) launcher: Arc<dyn ProcessLauncher>,
    /// Interprets their output
    pub(crate) parser: Arc<dyn OutputParser>,
}

/// Running-download bookkeeping
#[derive(Clone)]
pub(crate) struct RuntimeState {
    /// Cancellation tokens of downloads whose task has not finished yet
    pub(crate) active_downloads: Arc<Mutex<HashMap<DownloadId, CancellationToken>>>,
    /// Bounds concurrently running subprocesses (None = unlimited)
    pub(crate) concurrent_limit: Option<Arc<Semaphore>>,
    /// Cleared once shutdown starts
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Cancelled once shutdown starts; info and format lookups run under child tokens
    pub(crate) shutdown: CancellationToken,
}

/// Main orchestration service (cloneable - all fields are Arc-wrapped)
///
/// Accepts download requests, runs one task per download, and exposes the
/// registry, event stream, file store and probe operations.
#[derive(Clone)]
pub struct MediaDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Current state of every accepted download
    pub(crate) registry: Arc<DownloadRegistry>,
    /// Event fan-out to observers
    pub(crate) events: EventBroadcaster,
    /// External tool launcher and output parser
    pub(crate) tooling: Tooling,
    /// Download directory access
    pub(crate) files: FileStore,
    /// Active downloads, concurrency limit, shutdown flag
    pub(crate) runtime: RuntimeState,
}

impl MediaDownloader {
    /// Create a downloader that drives the real yt-dlp binary
    ///
    /// Validates the configuration, creates the download directory and
    /// resolves the tool from `config.tools`.
    pub async fn new(config: Config) -> Result<Self> {
        let launcher = CliProcessLauncher::from_config(&config.tools);
        tracing::info!(
            launcher = launcher.name(),
            program = %launcher.program().display(),
            "extraction tool configured"
        );
        Self::with_components(config, Arc::new(launcher), Arc::new(YtDlpOutputParser::new())).await
    }

    /// Create a downloader with an explicit launcher and parser
    pub async fn with_components(
        config: Config,
        launcher: Arc<dyn ProcessLauncher>,
        parser: Arc<dyn OutputParser>,
    ) -> Result<Self> {
        config.validate()?;

        let files = FileStore::new(config.download.download_dir.clone());
        files.ensure_dir().await.map_err(|e| match e {
            Error::Io(e) => Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create download directory '{}': {}",
                    config.download.download_dir.display(),
                    e
                ),
            )),
            other => other,
        })?;

        let concurrent_limit = match config.download.max_concurrent_downloads {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };

        let events = EventBroadcaster::new(config.events.channel_capacity);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(DownloadRegistry::new()),
            events,
            tooling: Tooling { launcher, parser },
            files,
            runtime: RuntimeState {
                active_downloads: Arc::new(Mutex::new(HashMap::new())),
                concurrent_limit,
                accepting_new: Arc::new(AtomicBool::new(true)),
                shutdown: CancellationToken::new(),
            },
        })
    }

    /// Subscribe to download events
    ///
    /// The subscription sees events published after this call. Use
    /// [`list_downloads`](Self::list_downloads) for the state of earlier ones.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{}: {:?}", event.name(), event.state());
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Current state of one download
    pub async fn get_download(&self, id: DownloadId) -> Result<DownloadState> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| crate::error::DownloadError::NotFound { id: id.0 }.into())
    }

    /// Current state of every download, oldest first
    pub async fn list_downloads(&self) -> Vec<DownloadState> {
        self.registry.list().await
    }

    /// Files in the download directory
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        self.files.list().await
    }

    /// Delete a file from the download directory
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        self.files.delete(name).await
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
