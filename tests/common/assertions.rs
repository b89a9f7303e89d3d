//! Waiting helpers for download outcomes

use media_dl::{DownloadId, DownloadState, Event, MediaDownloader, Subscription};
use std::time::Duration;

/// How long the helpers wait before giving up
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll the registry until `id` is terminal
pub async fn wait_for_terminal(downloader: &MediaDownloader, id: DownloadId) -> DownloadState {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            let state = downloader.get_download(id).await.expect("download exists");
            if state.status.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("download did not finish in time")
}

/// Collect the events of `id` up to and including its terminal one
pub async fn collect_events(subscription: &mut Subscription, id: DownloadId) -> Vec<Event> {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        let mut seen = Vec::new();
        loop {
            let event = subscription.recv().await.expect("subscription open");
            if event.download_id() != Some(id) {
                continue;
            }
            let done = event.is_terminal();
            seen.push(event);
            if done {
                return seen;
            }
        }
    })
    .await
    .expect("terminal event not received in time")
}

/// Poll until `id` has reported some progress
pub async fn wait_for_downloading(downloader: &MediaDownloader, id: DownloadId) -> DownloadState {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            let state = downloader.get_download(id).await.expect("download exists");
            if state.progress > 0.0 {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("download never made progress")
}
