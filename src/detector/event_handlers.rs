// src/detector/event_handlers.rs

//! Event handling logic for the detector core.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::descriptor::{PackageChange, SourceDescriptor, TargetDescriptor};
use crate::detector::resolve::coalesce_changes;
use crate::detector::scope::{watch_request, WatchRequest};
use crate::detector::{DetectorOptions, DetectorState};
use crate::types::FileChange;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorCommand {
    /// Stop the current watcher, if any.
    StopWatcher,
    /// Start watching the given roots.
    StartWatcher(WatchRequest),
    /// Cancel any pending debounce expiry and start a new window.
    RescheduleDebounce,
    /// Post one coalesced batch to the bus.
    Publish(Vec<PackageChange>),
}

/// Decision returned by the core after handling a single `DetectorEvent`.
#[derive(Debug, Clone, Default)]
pub struct DetectorStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<DetectorCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl DetectorStep {
    fn running(commands: Vec<DetectorCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Store (or replace) the source descriptor. Never touches the watcher.
pub fn handle_source_initialized(
    state: &mut DetectorState,
    source: Arc<SourceDescriptor>,
) -> DetectorStep {
    info!(packages = source.len(), root = ?source.root(), "source initialized");

    *state = match std::mem::take(state) {
        DetectorState::Uninitialized | DetectorState::SourceReady { .. } => {
            DetectorState::SourceReady { source }
        }
        DetectorState::Watching { target, .. } => DetectorState::Watching { source, target },
    };

    DetectorStep::running(Vec::new())
}

/// Store the target, restart the watcher on its scope.
///
/// The accumulated buffer and any pending debounce are left untouched, so
/// changes collected under the previous target are still delivered.
pub fn handle_target_selected(
    state: &mut DetectorState,
    target: Arc<TargetDescriptor>,
    options: &DetectorOptions,
) -> DetectorStep {
    let source = match state.source() {
        Some(source) => Arc::clone(source),
        None => {
            warn!(
                target = %target.name,
                "target selected before source was initialized; ignoring"
            );
            return DetectorStep::running(Vec::new());
        }
    };

    let request = watch_request(&source, &target, &options.watch_subdir);
    let previous = state.target().map(|t| t.name.as_str()).unwrap_or("<none>");
    info!(
        target = %target.name,
        previous = %previous,
        roots = ?request.roots,
        "target selected; restarting package change detector"
    );

    *state = DetectorState::Watching { source, target };

    DetectorStep::running(vec![
        DetectorCommand::StopWatcher,
        DetectorCommand::StartWatcher(request),
    ])
}

/// Append a raw change to the buffer and restart the debounce window.
pub fn handle_file_changed(
    state: &DetectorState,
    buffer: &mut Vec<String>,
    change: FileChange,
) -> DetectorStep {
    if state.source().is_none() {
        warn!(path = %change.path, "file change before source was initialized; dropping");
        return DetectorStep::running(Vec::new());
    }

    debug!(path = %change.path, kind = %change.kind, "buffered file change");
    buffer.push(change.path);

    DetectorStep::running(vec![DetectorCommand::RescheduleDebounce])
}

/// Drain the buffer, resolve and coalesce it, and publish the result.
///
/// An empty buffer publishes nothing; any other drain publishes exactly one
/// batch, which may be empty when no path resolved.
pub fn handle_debounce_elapsed(
    state: &DetectorState,
    buffer: &mut Vec<String>,
    options: &DetectorOptions,
) -> DetectorStep {
    let files = std::mem::take(buffer);
    if files.is_empty() {
        return DetectorStep::running(Vec::new());
    }

    let Some(source) = state.source() else {
        warn!(dropped = files.len(), "no source descriptor; dropping buffered changes");
        return DetectorStep::running(Vec::new());
    };

    // A non-empty drain always publishes, even if nothing resolved.
    let changes = coalesce_changes(source, &files, options.unresolved_paths);
    if changes.is_empty() {
        debug!(drained = files.len(), "no package resolved from drained changes");
    }

    let names: Vec<&str> = changes.iter().map(|c| c.package_name.as_str()).collect();
    debug!(drained = files.len(), packages = ?names, "coalesced package changes");

    DetectorStep::running(vec![DetectorCommand::Publish(changes)])
}
