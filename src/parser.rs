//! Interpretation of extraction tool output lines
//!
//! Turns raw stdout/stderr lines into [`ParsedEvent`]s. Parsers are pure:
//! they hold no per-download state, so one instance serves every download.

use regex::Regex;
use std::sync::LazyLock;

/// A meaningful fact extracted from one output line
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedEvent {
    /// Percentage found on a progress line
    Progress {
        /// Percent value as printed (not clamped)
        percent: f64,
    },
    /// Destination file announced by the tool (basename only)
    Filename {
        /// Output file name
        name: String,
    },
    /// Anything written to stderr
    Error {
        /// The stderr text
        text: String,
    },
}

/// Extracts events from tool output
pub trait OutputParser: Send + Sync {
    /// Interpret one stdout line; uninteresting lines yield an empty list
    fn parse_stdout(&self, line: &str) -> Vec<ParsedEvent>;

    /// Interpret one stderr line
    fn parse_stderr(&self, line: &str) -> Option<ParsedEvent>;

    /// Parser name for logging
    fn name(&self) -> &'static str;
}

// The patterns are literals, compilation cannot fail
#[allow(clippy::expect_used)]
static PROGRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+)%").expect("progress pattern is valid"));

// The leading bracket is optional so fragments split off a redrawn line still match
#[allow(clippy::expect_used)]
static DESTINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[?download\] Destination: (.+)").expect("destination pattern is valid")
});

/// Parser for yt-dlp's human-readable output
#[derive(Debug, Default, Clone, Copy)]
pub struct YtDlpOutputParser;

impl YtDlpOutputParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }
}

impl OutputParser for YtDlpOutputParser {
    fn parse_stdout(&self, line: &str) -> Vec<ParsedEvent> {
        let mut events = Vec::new();

        if let Some(percent) = PROGRESS_RE
            .captures(line)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            events.push(ParsedEvent::Progress { percent });
        }

        if let Some(path) = DESTINATION_RE.captures(line).and_then(|c| c.get(1)) {
            let name = basename(path.as_str().trim_end());
            if !name.is_empty() {
                events.push(ParsedEvent::Filename {
                    name: name.to_string(),
                });
            }
        }

        events
    }

    fn parse_stderr(&self, line: &str) -> Option<ParsedEvent> {
        let text = line.trim_end();
        if text.trim().is_empty() {
            return None;
        }
        Some(ParsedEvent::Error {
            text: text.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Last path component, accepting both separator styles
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
