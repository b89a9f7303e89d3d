//! In-memory registry of every download accepted by this process
//!
//! Holds a read side of each state machine, so queries always see the
//! latest committed state. Nothing is persisted: a restart starts empty.

use crate::types::{DownloadId, DownloadState};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, watch};

/// Registry of downloads, keyed by id
#[derive(Debug)]
pub struct DownloadRegistry {
    next_id: AtomicU64,
    entries: RwLock<BTreeMap<DownloadId, watch::Receiver<DownloadState>>>,
}

impl Default for DownloadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadRegistry {
    /// Create an empty registry; the first issued id is 1
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Issue a fresh identifier
    pub fn allocate_id(&self) -> DownloadId {
        DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register the read side of a state machine
    ///
    /// Returns `false` (and keeps the existing entry) if `id` is taken.
    pub async fn register(&self, id: DownloadId, state: watch::Receiver<DownloadState>) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&id) {
            tracing::warn!(download_id = id.0, "download id already registered");
            return false;
        }
        entries.insert(id, state);
        true
    }

    /// Current state of one download
    pub async fn get(&self, id: DownloadId) -> Option<DownloadState> {
        self.entries.read().await.get(&id).map(|rx| rx.borrow().clone())
    }

    /// Current state of every download, ordered by id
    pub async fn list(&self) -> Vec<DownloadState> {
        self.entries
            .read()
            .await
            .values()
            .map(|rx| rx.borrow().clone())
            .collect()
    }

    /// Number of registered downloads
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing has been registered yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
