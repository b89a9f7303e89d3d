//! Per-download task: runs the tool and feeds its output to the state machine.

use crate::process::{OutputLine, ProcessExit};
use crate::state_machine::{DownloadStateMachine, Outcome};
use crate::types::{DownloadId, Status};
use tokio_util::sync::CancellationToken;

use super::MediaDownloader;

impl MediaDownloader {
    /// Drive one download from `Starting` to a terminal state
    ///
    /// This task is the only writer of `machine`. It suspends only while
    /// waiting for a concurrency slot, for more output, or for the exit.
    pub(crate) async fn run_download(
        &self,
        mut machine: DownloadStateMachine,
        args: Vec<String>,
        cancel: CancellationToken,
    ) {
        let id = machine.state().id;

        let _permit = match &self.runtime.concurrent_limit {
            Some(limit) => {
                tokio::select! {
                    permit = limit.clone().acquire_owned() => permit.ok(),
                    _ = cancel.cancelled() => {
                        machine.cancel();
                        tracing::info!(download_id = id.0, "download cancelled before start");
                        self.release(id).await;
                        return;
                    }
                }
            }
            None => None,
        };

        tracing::debug!(download_id = id.0, args = ?args, "starting extraction tool");
        let mut handle = self.tooling.launcher.start(&args, cancel.clone()).await;

        while let Some(line) = handle.next_output().await {
            match line {
                OutputLine::Stdout(line) => {
                    tracing::debug!(download_id = id.0, line = %line, "tool stdout");
                    for event in self.tooling.parser.parse_stdout(&line) {
                        machine.apply(event);
                    }
                }
                OutputLine::Stderr(line) => {
                    tracing::debug!(download_id = id.0, line = %line, "tool stderr");
                    if let Some(event) = self.tooling.parser.parse_stderr(&line)
                        && machine.apply(event) == Outcome::Published
                    {
                        tracing::warn!(download_id = id.0, error = %line, "tool reported an error");
                    }
                }
            }
        }

        let exit = handle.wait().await;
        // A tool that finished cleanly wins over a cancel that raced its exit
        if cancel.is_cancelled() && !exit.is_success() {
            machine.cancel();
        } else {
            if let ProcessExit::LaunchFailed(reason) = &exit {
                tracing::error!(download_id = id.0, error = %reason, "extraction tool failed to launch");
            }
            machine.finish(&exit);
        }

        let state = machine.state();
        match state.status {
            Status::Completed => tracing::info!(
                download_id = id.0,
                filename = %state.filename,
                "download completed"
            ),
            Status::Errored => tracing::warn!(
                download_id = id.0,
                exit = ?exit,
                error = state.error.as_deref().unwrap_or_default(),
                "download failed"
            ),
            // Not reachable once the exit has been applied
            Status::Starting | Status::Downloading => {}
        }

        self.release(id).await;
    }

    async fn release(&self, id: DownloadId) {
        self.runtime.active_downloads.lock().await.remove(&id);
    }
}
