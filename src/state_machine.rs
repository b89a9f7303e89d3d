//! Per-download state machine
//!
//! Each download owns exactly one [`DownloadStateMachine`]. Only the task
//! driving that download mutates it; everyone else reads snapshots through
//! the [`watch`] channel handed out at construction (kept by the registry)
//! or receives them as published events.
//!
//! Transitions:
//!
//! | From                 | Trigger                      | To          | Publishes |
//! |----------------------|------------------------------|-------------|-----------|
//! | Starting             | progress                     | Downloading | yes       |
//! | Downloading          | higher progress              | Downloading | yes       |
//! | Starting/Downloading | filename (first one only)    | unchanged   | no        |
//! | Starting/Downloading | stderr text                  | Errored     | yes       |
//! | Starting/Downloading | exit code 0                  | Completed   | yes       |
//! | Starting/Downloading | non-zero exit, launch failure, kill, cancel | Errored | yes |
//!
//! Terminal states absorb every further input.

use crate::events::EventSink;
use crate::parser::ParsedEvent;
use crate::process::ProcessExit;
use crate::types::{DownloadId, DownloadState, Event, Status};
use std::sync::Arc;
use tokio::sync::watch;

/// Error text recorded when a download is cancelled
pub const CANCELLED_MESSAGE: &str = "download cancelled";

/// What an input did to the state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// State changed and a snapshot was published
    Published,
    /// State changed without publishing (filename capture)
    Recorded,
    /// No change
    Ignored,
}

/// Canonical state of one download
pub struct DownloadStateMachine {
    state: DownloadState,
    tx: watch::Sender<DownloadState>,
    sink: Arc<dyn EventSink>,
}

impl DownloadStateMachine {
    /// Create a machine in `Starting` and the receiver that mirrors it
    pub fn new(
        id: DownloadId,
        url: impl Into<String>,
        sink: Arc<dyn EventSink>,
    ) -> (Self, watch::Receiver<DownloadState>) {
        let state = DownloadState::starting(id, url);
        let (tx, rx) = watch::channel(state.clone());
        (Self { state, tx, sink }, rx)
    }

    /// Current state
    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    /// Publish the initial `Starting` snapshot
    pub fn announce(&self) {
        self.sink.publish(Event::for_state(self.state.clone()));
    }

    /// Apply one parsed output event
    pub fn apply(&mut self, event: ParsedEvent) -> Outcome {
        if self.state.status.is_terminal() {
            return Outcome::Ignored;
        }

        match event {
            ParsedEvent::Progress { percent } => {
                let percent = percent.clamp(0.0, 100.0);
                match self.state.status {
                    Status::Starting => {
                        self.state.status = Status::Downloading;
                        self.state.progress = percent;
                    }
                    Status::Downloading if percent > self.state.progress => {
                        self.state.progress = percent;
                    }
                    _ => return Outcome::Ignored,
                }
                self.commit(true)
            }
            ParsedEvent::Filename { name } => {
                if !self.state.filename.is_empty() {
                    return Outcome::Ignored;
                }
                tracing::debug!(download_id = self.state.id.0, filename = %name, "destination resolved");
                self.state.filename = name;
                self.commit(false)
            }
            ParsedEvent::Error { text } => self.fail(text),
        }
    }

    /// Apply the process exit
    pub fn finish(&mut self, exit: &ProcessExit) -> Outcome {
        if self.state.status.is_terminal() {
            return Outcome::Ignored;
        }

        match exit {
            ProcessExit::Code(0) => {
                self.state.status = Status::Completed;
                self.state.progress = 100.0;
                self.commit(true)
            }
            ProcessExit::Code(code) => self.fail(format!("Process exited with code {code}")),
            ProcessExit::Terminated => self.fail("Process terminated by signal".to_string()),
            ProcessExit::LaunchFailed(reason) => {
                self.fail(format!("Failed to start download process: {reason}"))
            }
        }
    }

    /// Mark the download cancelled
    pub fn cancel(&mut self) -> Outcome {
        if self.state.status.is_terminal() {
            return Outcome::Ignored;
        }
        self.fail(CANCELLED_MESSAGE.to_string())
    }

    fn fail(&mut self, error: String) -> Outcome {
        self.state.status = Status::Errored;
        self.state.error = Some(error);
        self.commit(true)
    }

    /// Mirror the state to readers, then optionally publish it
    fn commit(&self, publish: bool) -> Outcome {
        self.tx.send_replace(self.state.clone());
        if publish {
            self.sink.publish(Event::for_state(self.state.clone()));
            Outcome::Published
        } else {
            Outcome::Recorded
        }
    }
}
