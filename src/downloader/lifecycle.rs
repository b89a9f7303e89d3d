//! Shutdown coordination.

use crate::error::Result;
use crate::events::EventSink;
use crate::types::Event;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::MediaDownloader;

/// Upper bound on waiting for killed tools to be reaped
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

impl MediaDownloader {
    /// Gracefully shut down the downloader
    ///
    /// 1. Stops accepting new downloads (`submit` returns `ShuttingDown`)
    /// 2. Cancels every active download and in-flight info lookup, which kills
    ///    their tool processes
    /// 3. Waits up to 30 seconds for the download tasks to finish
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Cancelled downloads end in the error state with `"download cancelled"`.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.runtime.accepting_new.store(false, Ordering::SeqCst);
        self.runtime.shutdown.cancel();
        tracing::info!("Stopped accepting new downloads");

        self.cancel_all().await;

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.wait_for_active_downloads()).await {
            Ok(()) => tracing::info!("All active downloads finished"),
            Err(_) => tracing::warn!(
                "Timeout waiting for downloads to finish, proceeding with shutdown"
            ),
        }

        self.events.publish(Event::Shutdown);
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new downloads are still accepted
    pub fn is_accepting(&self) -> bool {
        self.runtime.accepting_new.load(Ordering::SeqCst)
    }

    async fn cancel_all(&self) {
        let active = self.runtime.active_downloads.lock().await;
        tracing::debug!(active_count = active.len(), "Cancelling all active downloads");

        for (id, token) in active.iter() {
            tracing::debug!(download_id = id.0, "Signaling cancellation");
            token.cancel();
        }
    }

    async fn wait_for_active_downloads(&self) {
        loop {
            let active_count = self.runtime.active_downloads.lock().await.len();
            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for active downloads to finish");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
