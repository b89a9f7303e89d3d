//! Download intake and cancellation.

use crate::error::{DownloadError, Error, Result};
use crate::events::EventSink;
use crate::state_machine::DownloadStateMachine;
use crate::types::{DownloadId, DownloadRequest};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

use super::MediaDownloader;
use super::args::build_download_args;

impl MediaDownloader {
    /// Accept a download request
    ///
    /// Validates the request, registers a new download in `Starting`, publishes
    /// its start event and spawns the task that runs the tool. Returns as soon
    /// as the id is issued; progress arrives through events and the registry.
    ///
    /// Invalid requests are rejected before any id is issued or process is
    /// started.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use media_dl::*;
    /// # async fn example(downloader: MediaDownloader) -> Result<()> {
    /// let id = downloader
    ///     .submit(DownloadRequest::audio("https://example.com/watch?v=1", "mp3"))
    ///     .await?;
    /// println!("accepted as {id}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit(&self, request: DownloadRequest) -> Result<DownloadId> {
        if !self.runtime.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let request = request.validate()?;
        let id = self.registry.allocate_id();

        // The token is reachable before the download is visible, so a cancel
        // arriving right after registration always finds it
        let cancel = CancellationToken::new();
        self.runtime
            .active_downloads
            .lock()
            .await
            .insert(id, cancel.clone());

        let sink: Arc<dyn EventSink> = Arc::new(self.events.clone());
        let (machine, state_rx) = DownloadStateMachine::new(id, request.url(), sink);
        if !self.registry.register(id, state_rx).await {
            self.runtime.active_downloads.lock().await.remove(&id);
            return Err(Error::Other(format!("download id {id} is already in use")));
        }
        machine.announce();

        // Shutdown may have swept the active set while this request was registering
        if !self.runtime.accepting_new.load(Ordering::SeqCst) {
            cancel.cancel();
        }

        let args = build_download_args(&self.config.download, &request);

        tracing::info!(download_id = id.0, url = request.url(), "download accepted");

        let downloader = self.clone();
        tokio::spawn(async move {
            downloader.run_download(machine, args, cancel).await;
        });

        Ok(id)
    }

    /// Cancel a running download
    ///
    /// Kills the tool process; the download ends in the error state with the
    /// message `"download cancelled"`.
    ///
    /// # Errors
    ///
    /// - `DownloadError::NotFound` if the id is unknown
    /// - `DownloadError::InvalidState` if the download already finished
    pub async fn cancel(&self, id: DownloadId) -> Result<()> {
        let state = self.get_download(id).await?;
        if state.status.is_terminal() {
            return Err(invalid_state(id, &state.status.to_string()));
        }

        let active = self.runtime.active_downloads.lock().await;
        match active.get(&id) {
            Some(token) => {
                tracing::info!(download_id = id.0, "cancelling download");
                token.cancel();
                Ok(())
            }
            None => {
                // Task finished between the state read and the lock
                drop(active);
                let status = self.get_download(id).await?.status;
                Err(invalid_state(id, &status.to_string()))
            }
        }
    }
}

fn invalid_state(id: DownloadId, current_state: &str) -> Error {
    Error::Download(DownloadError::InvalidState {
        id: id.0,
        operation: "cancel".to_string(),
        current_state: current_state.to_string(),
    })
}
