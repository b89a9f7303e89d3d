//! MediaDownloader tests driven by a scripted extraction tool.

use super::test_helpers::*;
use super::*;
use crate::error::{DownloadError, ValidationError};
use crate::process::ProcessExit;
use crate::types::{DownloadRequest, Event, Status};
use std::time::Duration;
