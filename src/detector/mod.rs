// src/detector/mod.rs

//! Package change detector.
//!
//! Waits until it has both a source descriptor and a target descriptor, then
//! watches the `src` directories of the source packages the target depends
//! on. Raw file changes are accumulated and, after a quiet period, resolved
//! to their owning packages and posted to the bus as one
//! [`BusEvent::PackagesChanged`](crate::bus::BusEvent::PackagesChanged).
//!
//! Selecting a new target restarts the watcher. Changes accumulated under the
//! previous target are kept and delivered with the next batch.
//!
//! The pure state machine lives in [`core`]; the async shell that talks to
//! the bus, the watch backend and the timer is [`runtime`].

use std::sync::Arc;
use std::time::Duration;

use crate::descriptor::{SourceDescriptor, TargetDescriptor};
use crate::types::{FileChange, UnresolvedPathBehaviour};

pub mod core;
pub mod debounce;
pub mod event_handlers;
pub mod resolve;
pub mod runtime;
pub mod scope;

pub use self::core::DetectorCore;
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use event_handlers::{DetectorCommand, DetectorStep};
pub use resolve::{coalesce_changes, identify_changed_package};
pub use runtime::ChangeDetector;
pub use scope::{watch_request, watch_scope, WatchRequest, DEFAULT_WATCH_SUBDIR};

/// Lifecycle of the detector.
#[derive(Debug, Clone, Default)]
pub enum DetectorState {
    /// Nothing received yet.
    #[default]
    Uninitialized,
    /// Source packages known, no target selected, no watcher.
    SourceReady { source: Arc<SourceDescriptor> },
    /// Target selected and a watcher started for its scope.
    Watching {
        source: Arc<SourceDescriptor>,
        target: Arc<TargetDescriptor>,
    },
}

impl DetectorState {
    pub fn source(&self) -> Option<&Arc<SourceDescriptor>> {
        match self {
            DetectorState::Uninitialized => None,
            DetectorState::SourceReady { source } => Some(source),
            DetectorState::Watching { source, .. } => Some(source),
        }
    }

    pub fn target(&self) -> Option<&Arc<TargetDescriptor>> {
        match self {
            DetectorState::Watching { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Tunables shared by the core and the async shell.
#[derive(Debug, Clone)]
pub struct DetectorOptions {
    /// Quiet period before buffered changes are processed.
    pub debounce: Duration,
    /// Sub-directory of each package that gets watched.
    pub watch_subdir: String,
    /// Handling of paths that do not belong to any known package.
    pub unresolved_paths: UnresolvedPathBehaviour,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            watch_subdir: DEFAULT_WATCH_SUBDIR.to_string(),
            unresolved_paths: UnresolvedPathBehaviour::default(),
        }
    }
}

/// Inputs to the detector core.
#[derive(Debug, Clone)]
pub enum DetectorEvent {
    SourceInitialized(Arc<SourceDescriptor>),
    TargetSelected(Arc<TargetDescriptor>),
    /// A raw file event from the watcher.
    FileChanged(FileChange),
    /// The debounce window passed without new file events.
    DebounceElapsed,
    ShutdownRequested,
}
