//! Traits and types for external process supervision

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Buffered lines per output channel before the reader waits for the consumer
pub const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// How a supervised process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    /// The process exited with this code
    Code(i32),
    /// The process ended without an exit code (killed by a signal)
    Terminated,
    /// The executable could not be started (not found, permission denied, ...)
    LaunchFailed(String),
}

impl ProcessExit {
    /// Returns `true` only for exit code 0
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Code(0))
    }
}

/// One line of tool output, tagged with the channel it arrived on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Line from standard output
    Stdout(String),
    /// Line from standard error
    Stderr(String),
}

/// Handle to a running (or failed-to-launch) subprocess
///
/// Both output channels close once the process has exited and its pipes are
/// drained; the exit notification is sent only after that, so every line is
/// observable before [`wait`](Self::wait) resolves.
#[derive(Debug)]
pub struct ProcessHandle {
    stdout: mpsc::Receiver<String>,
    stderr: mpsc::Receiver<String>,
    exit: oneshot::Receiver<ProcessExit>,
    stdout_open: bool,
    stderr_open: bool,
}

impl ProcessHandle {
    /// Assemble a handle from its channels
    pub fn new(
        stdout: mpsc::Receiver<String>,
        stderr: mpsc::Receiver<String>,
        exit: oneshot::Receiver<ProcessExit>,
    ) -> Self {
        Self {
            stdout,
            stderr,
            exit,
            stdout_open: true,
            stderr_open: true,
        }
    }

    /// Handle for a process that never started: no output, immediate exit
    pub fn launch_failed(reason: impl Into<String>) -> Self {
        let (_, stdout) = mpsc::channel(1);
        let (_, stderr) = mpsc::channel(1);
        let (exit_tx, exit) = oneshot::channel();
        exit_tx.send(ProcessExit::LaunchFailed(reason.into())).ok();
        Self::new(stdout, stderr, exit)
    }

    /// Next line from either channel, `None` once both are closed
    ///
    /// Lines keep their order within a channel; no ordering is implied
    /// between stdout and stderr.
    pub async fn next_output(&mut self) -> Option<OutputLine> {
        loop {
            if !self.stdout_open && !self.stderr_open {
                return None;
            }

            tokio::select! {
                line = self.stdout.recv(), if self.stdout_open => match line {
                    Some(line) => return Some(OutputLine::Stdout(line)),
                    None => self.stdout_open = false,
                },
                line = self.stderr.recv(), if self.stderr_open => match line {
                    Some(line) => return Some(OutputLine::Stderr(line)),
                    None => self.stderr_open = false,
                },
            }
        }
    }

    /// Wait for the exit notification
    ///
    /// A supervisor that disappears without reporting counts as `Terminated`.
    pub async fn wait(self) -> ProcessExit {
        self.exit.await.unwrap_or(ProcessExit::Terminated)
    }

    /// Drain all output and wait for exit
    pub async fn collect(mut self) -> CollectedOutput {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some(line) = self.next_output().await {
            match line {
                OutputLine::Stdout(line) => stdout.push(line),
                OutputLine::Stderr(line) => stderr.push(line),
            }
        }
        let exit = self.wait().await;
        CollectedOutput {
            stdout,
            stderr,
            exit,
        }
    }
}

/// Complete output of a finished process
#[derive(Debug, Clone)]
pub struct CollectedOutput {
    /// Standard output lines
    pub stdout: Vec<String>,
    /// Standard error lines
    pub stderr: Vec<String>,
    /// How the process ended
    pub exit: ProcessExit,
}

/// Starts external extraction tool processes
///
/// `start` never fails: launch problems are reported through the returned
/// handle as [`ProcessExit::LaunchFailed`], which keeps "one request, one
/// terminal outcome" uniform for callers.
///
/// Cancelling `cancel` kills the process; the handle then reports
/// [`ProcessExit::Terminated`] (or whatever code the platform assigns).
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the tool with `args`
    async fn start(&self, args: &[String], cancel: CancellationToken) -> ProcessHandle;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
