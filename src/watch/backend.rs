// src/watch/backend.rs

//! Pluggable watch backend abstraction.
//!
//! The detector talks to a `WatchBackend` instead of `notify` directly, so a
//! fake backend can be swapped in for tests while production uses
//! [`NotifyBackend`].
//!
//! Backends report file events through the `mpsc::UnboundedSender<FileChange>`
//! they were constructed with; the detector owns the matching receiver.

use tokio::sync::mpsc;
use tracing::debug;

use crate::detector::WatchRequest;
use crate::errors::Result;
use crate::types::FileChange;
use crate::watch::watcher::{spawn_watcher, WatchFilters, WatcherHandle};

/// Trait abstracting how directories are watched.
pub trait WatchBackend: Send {
    /// Start watching the requested roots. Called after `stop`, so at most
    /// one session is active at a time.
    fn start(&mut self, request: &WatchRequest) -> Result<()>;

    /// Stop the current session. Must be a no-op when nothing is watched.
    fn stop(&mut self);
}

/// Production backend built on `notify`.
#[derive(Debug)]
pub struct NotifyBackend {
    changes_tx: mpsc::UnboundedSender<FileChange>,
    filters: WatchFilters,
    handle: Option<WatcherHandle>,
}

impl NotifyBackend {
    pub fn new(changes_tx: mpsc::UnboundedSender<FileChange>, filters: WatchFilters) -> Self {
        Self {
            changes_tx,
            filters,
            handle: None,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.handle.is_some()
    }
}

impl WatchBackend for NotifyBackend {
    fn start(&mut self, request: &WatchRequest) -> Result<()> {
        let handle = spawn_watcher(request, self.filters.clone(), self.changes_tx.clone())?;
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(roots = ?handle.roots(), "stopping file watcher");
        }
    }
}
