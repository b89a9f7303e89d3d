//! Listing and deleting files in the download directory
//!
//! Every delete is confined to the directory: names are fully URL-decoded,
//! must be a single plain path component, and the resolved path must sit
//! inside the canonical download directory.

use crate::error::{FileError, Result};
use crate::types::StoredFile;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};

/// Upper bound on nested percent-decoding passes
const MAX_DECODE_PASSES: usize = 4;

/// File operations on one download directory
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Download directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Regular files in the directory, sorted by name
    ///
    /// A directory that does not exist yet lists as empty.
    pub async fn list(&self) -> Result<Vec<StoredFile>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    // Removed between read_dir and stat
                    tracing::debug!(path = %entry.path().display(), error = %e, "skipping entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let modified_at: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());
            let created_at = metadata
                .created()
                .map(DateTime::from)
                .unwrap_or(modified_at);

            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                created_at,
                modified_at,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Delete one file by name
    ///
    /// `name` may still carry percent-encoding; it is decoded until stable
    /// before the checks run.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let decoded = decode_fully(name).ok_or_else(|| traversal(name))?;
        if !is_plain_file_name(&decoded) {
            tracing::warn!(name, "rejected file name outside the download directory");
            return Err(traversal(name).into());
        }

        let not_found = || FileError::NotFound {
            name: decoded.clone(),
        };

        let root = match tokio::fs::canonicalize(&self.dir).await {
            Ok(root) => root,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found().into()),
            Err(e) => return Err(e.into()),
        };
        let target = match tokio::fs::canonicalize(root.join(&decoded)).await {
            Ok(target) => target,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found().into()),
            Err(e) => return Err(e.into()),
        };
        if !target.starts_with(&root) || target == root {
            tracing::warn!(name, target = %target.display(), "resolved path escapes the download directory");
            return Err(traversal(name).into());
        }

        let metadata = tokio::fs::metadata(&target).await?;
        if metadata.is_dir() {
            tokio::fs::remove_dir_all(&target).await?;
        } else {
            tokio::fs::remove_file(&target).await?;
        }

        tracing::info!(file = %decoded, "deleted file");
        Ok(())
    }
}

fn traversal(name: &str) -> FileError {
    FileError::PathTraversal {
        name: name.to_string(),
    }
}

/// Percent-decode until the value stops changing
///
/// `None` for invalid UTF-8 or encoding nested deeper than we are willing
/// to unwrap.
fn decode_fully(name: &str) -> Option<String> {
    let mut current = name.to_string();
    for _ in 0..MAX_DECODE_PASSES {
        let next = urlencoding::decode(&current).ok()?.into_owned();
        if next == current {
            return Some(current);
        }
        current = next;
    }
    None
}

/// A single normal path component with no separators of either style
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
