//! External extraction tool supervision
//!
//! One download request maps to exactly one subprocess. The [`ProcessLauncher`]
//! trait is the seam between the orchestration core and the operating system:
//!
//! - [`CliProcessLauncher`]: spawns the real `yt-dlp` binary with tokio
//! - test code provides scripted launchers that replay canned output
//!
//! A launch returns a [`ProcessHandle`] exposing line-delimited stdout and
//! stderr plus a single [`ProcessExit`] notification. Launch failures do not
//! surface as errors from `start`; the handle reports
//! [`ProcessExit::LaunchFailed`] immediately instead.
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::process::{CliProcessLauncher, OutputLine, ProcessLauncher};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let launcher = CliProcessLauncher::from_path().expect("yt-dlp not found in PATH");
//! let args = vec!["--version".to_string()];
//! let mut handle = launcher.start(&args, CancellationToken::new()).await;
//!
//! while let Some(line) = handle.next_output().await {
//!     match line {
//!         OutputLine::Stdout(text) => println!("out: {text}"),
//!         OutputLine::Stderr(text) => eprintln!("err: {text}"),
//!     }
//! }
//! println!("exit: {:?}", handle.wait().await);
//! # }
//! ```

mod cli;
mod traits;

pub use cli::CliProcessLauncher;
pub use traits::{
    CollectedOutput, OUTPUT_CHANNEL_CAPACITY, OutputLine, ProcessExit, ProcessHandle,
    ProcessLauncher,
};
