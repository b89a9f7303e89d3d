//! Subprocess launcher for the external yt-dlp binary

use super::traits::{OUTPUT_CHANNEL_CAPACITY, ProcessExit, ProcessHandle, ProcessLauncher};
use crate::config::ToolsConfig;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

const DEFAULT_PROGRAM: &str = "yt-dlp";

/// How long to keep reading output once the tool has exited
const EXIT_DRAIN_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

/// Launches the external `yt-dlp` binary
///
/// Output is split into lines on both `\n` and `\r`, since the tool redraws
/// its progress line with carriage returns.
///
/// # Examples
///
/// ```no_run
/// use media_dl::process::{CliProcessLauncher, ProcessLauncher};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let launcher = CliProcessLauncher::from_path().expect("yt-dlp not found in PATH");
/// let output = launcher
///     .start(&["--version".to_string()], CancellationToken::new())
///     .await
///     .collect()
///     .await;
/// println!("{:?}", output.stdout);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CliProcessLauncher {
    program: PathBuf,
}

impl CliProcessLauncher {
    /// Create a launcher with an explicit binary path
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which(DEFAULT_PROGRAM).ok().map(Self::new)
    }

    /// Resolve the binary from configuration
    ///
    /// An explicit `ytdlp_path` wins. Otherwise PATH is searched when allowed,
    /// and the bare program name is used as a last resort so that a missing
    /// tool surfaces as a launch failure on the first download.
    pub fn from_config(tools: &ToolsConfig) -> Self {
        if let Some(path) = &tools.ytdlp_path {
            return Self::new(path.clone());
        }
        if tools.search_path
            && let Some(found) = Self::from_path()
        {
            tracing::debug!(path = %found.program.display(), "found yt-dlp in PATH");
            return found;
        }
        tracing::warn!("yt-dlp not found in PATH, downloads will fail until it is installed");
        Self::new(DEFAULT_PROGRAM)
    }

    /// Path of the binary this launcher runs
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

#[async_trait]
impl ProcessLauncher for CliProcessLauncher {
    async fn start(&self, args: &[String], cancel: CancellationToken) -> ProcessHandle {
        let spawned = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(
                    program = %self.program.display(),
                    error = %e,
                    "failed to launch extraction tool"
                );
                return ProcessHandle::launch_failed(format!(
                    "failed to launch {}: {}",
                    self.program.display(),
                    e
                ));
            }
        };

        let (stdout_tx, stdout_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        let (stderr_tx, stderr_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        let (exit_tx, exit_rx) = oneshot::channel();

        let stdout_reader = child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward_lines(out, stdout_tx, "stdout")));
        let stderr_reader = child
            .stderr
            .take()
            .map(|err| tokio::spawn(forward_lines(err, stderr_tx, "stderr")));

        let pid = child.id();
        tracing::debug!(pid = ?pid, program = %self.program.display(), "extraction tool started");

        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => Some(status),
                _ = cancel.cancelled() => None,
            };

            let killed = status.is_none();
            let status = match status {
                Some(status) => status,
                None => {
                    tracing::debug!(pid = ?pid, "killing extraction tool");
                    if let Err(e) = child.start_kill() {
                        tracing::warn!(pid = ?pid, error = %e, "failed to kill extraction tool");
                    }
                    child.wait().await
                }
            };

            // Pipes close when the process exits; drain them before reporting.
            // Grandchildren may inherit the pipes and hold them open.
            let readers: Vec<_> = [stdout_reader, stderr_reader].into_iter().flatten().collect();
            let aborts: Vec<_> = readers.iter().map(|r| r.abort_handle()).collect();
            let drain = async {
                for reader in readers {
                    reader.await.ok();
                }
            };
            if tokio::time::timeout(EXIT_DRAIN_GRACE, drain).await.is_err() {
                tracing::debug!(pid = ?pid, killed, "output pipes still open after exit, abandoning them");
                aborts.iter().for_each(|a| a.abort());
            }

            let exit = match status {
                Ok(status) => status.code().map_or(ProcessExit::Terminated, ProcessExit::Code),
                Err(e) => {
                    tracing::warn!(pid = ?pid, error = %e, "failed to wait for extraction tool");
                    ProcessExit::Terminated
                }
            };
            tracing::debug!(pid = ?pid, exit = ?exit, "extraction tool exited");
            exit_tx.send(exit).ok();
        });

        ProcessHandle::new(stdout_rx, stderr_rx, exit_rx)
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}

/// Read `reader` to EOF, sending each non-empty line
///
/// Keeps reading after the receiver is gone so the child never blocks on a
/// full pipe.
async fn forward_lines<R>(reader: R, tx: mpsc::Sender<String>, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut receiver_alive = true;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(stream, error = %e, "error reading tool output");
                break;
            }
        }

        for piece in buf.split(|b| *b == b'\r' || *b == b'\n') {
            if piece.is_empty() {
                continue;
            }
            let line = String::from_utf8_lossy(piece).into_owned();
            tracing::trace!(stream, line = %line, "tool output");
            if receiver_alive && tx.send(line).await.is_err() {
                receiver_alive = false;
            }
        }
    }
}
