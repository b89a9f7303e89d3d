//! Shared test doubles and helpers for MediaDownloader tests.

use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::events::{EventSink, Subscription};
use crate::parser::YtDlpOutputParser;
use crate::process::{ProcessExit, ProcessHandle, ProcessLauncher};
use crate::types::{DownloadId, DownloadState, Event};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// One scripted action of a fake tool run
#[derive(Clone, Debug)]
pub(crate) enum Step {
    /// Write a stdout line
    Stdout(String),
    /// Write a stderr line
    Stderr(String),
    /// Pause (cut short by cancellation)
    Delay(Duration),
    /// Exit with this outcome
    Exit(ProcessExit),
    /// Run until cancelled
    Hang,
    /// Run until cancelled, then exit with this outcome regardless
    HangThenExit(ProcessExit),
}

impl Step {
    pub(crate) fn out(line: &str) -> Self {
        Step::Stdout(line.to_string())
    }

    pub(crate) fn err(line: &str) -> Self {
        Step::Stderr(line.to_string())
    }

    pub(crate) fn delay_ms(ms: u64) -> Self {
        Step::Delay(Duration::from_millis(ms))
    }

    pub(crate) fn exit(code: i32) -> Self {
        Step::Exit(ProcessExit::Code(code))
    }
}

/// Launcher that plays back a script chosen by the last argument (the URL)
///
/// URLs without a script exit 0 immediately. Every start is recorded.
#[derive(Default)]
pub(crate) struct ScriptedLauncher {
    scripts: Mutex<HashMap<String, Vec<Step>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedLauncher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register the script for `url`
    pub(crate) fn script(self, url: &str, steps: Vec<Step>) -> Self {
        self.scripts.lock().unwrap().insert(url.to_string(), steps);
        self
    }

    /// Argument vectors of every start so far
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessLauncher for ScriptedLauncher {
    async fn start(&self, args: &[String], cancel: CancellationToken) -> ProcessHandle {
        self.calls.lock().unwrap().push(args.to_vec());

        let url = args.last().cloned().unwrap_or_default();
        let steps = self
            .scripts
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| vec![Step::exit(0)]);

        if let Some(Step::Exit(ProcessExit::LaunchFailed(reason))) = steps.first() {
            return ProcessHandle::launch_failed(reason.clone());
        }

        let (out_tx, out_rx) = mpsc::channel(64);
        let (err_tx, err_rx) = mpsc::channel(64);
        let (exit_tx, exit_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut exit = ProcessExit::Code(0);
            for step in steps {
                match step {
                    Step::Stdout(line) => {
                        out_tx.send(line).await.ok();
                    }
                    Step::Stderr(line) => {
                        err_tx.send(line).await.ok();
                    }
                    Step::Delay(duration) => {
                        tokio::select! {
                            _ = tokio::time::sleep(duration) => {}
                            _ = cancel.cancelled() => {
                                exit = ProcessExit::Terminated;
                                break;
                            }
                        }
                    }
                    Step::Exit(outcome) => {
                        exit = outcome;
                        break;
                    }
                    Step::Hang => {
                        cancel.cancelled().await;
                        exit = ProcessExit::Terminated;
                        break;
                    }
                    Step::HangThenExit(outcome) => {
                        cancel.cancelled().await;
                        exit = outcome;
                        break;
                    }
                }
            }
            drop(out_tx);
            drop(err_tx);
            exit_tx.send(exit).ok();
        });

        ProcessHandle::new(out_rx, err_rx, exit_rx)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Event sink that records everything published to it
#[derive(Default)]
pub(crate) struct CapturingSink {
    events: Mutex<Vec<Event>>,
}

impl CapturingSink {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CapturingSink {
    fn publish(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

/// Create a downloader backed by `launcher` inside a temp directory
///
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    launcher: Arc<ScriptedLauncher>,
) -> (MediaDownloader, tempfile::TempDir) {
    create_test_downloader_with(launcher, |_| {}).await
}

/// Like [`create_test_downloader`], with a hook to adjust the config
pub(crate) async fn create_test_downloader_with(
    launcher: Arc<ScriptedLauncher>,
    adjust: impl FnOnce(&mut Config),
) -> (MediaDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    adjust(&mut config);

    let downloader =
        MediaDownloader::with_components(config, launcher, Arc::new(YtDlpOutputParser::new()))
            .await
            .unwrap();
    (downloader, temp_dir)
}

/// Poll the registry until `id` is terminal
pub(crate) async fn wait_for_terminal(downloader: &MediaDownloader, id: DownloadId) -> DownloadState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = downloader.get_download(id).await.unwrap();
            if state.status.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("download did not reach a terminal state")
}

/// Collect events for `id` until its terminal event arrives
pub(crate) async fn events_until_terminal(
    subscription: &mut Subscription,
    id: DownloadId,
) -> Vec<Event> {
    tokio::time::timeout(Duration::from_secs(5), async {
        let mut seen = Vec::new();
        loop {
            let event = subscription.recv().await.unwrap();
            if event.download_id() != Some(id) {
                continue;
            }
            let terminal = event.is_terminal();
            seen.push(event);
            if terminal {
                return seen;
            }
        }
    })
    .await
    .expect("terminal event not received")
}
