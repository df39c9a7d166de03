// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use notify::event::{ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::detector::WatchRequest;
use crate::errors::Result;
use crate::types::{ChangeKind, FileChange};
use crate::watch::hash::ContentFilter;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::ExcludeFilter;

/// Filters applied to every raw event before it reaches the detector.
#[derive(Debug, Clone, Default)]
pub struct WatchFilters {
    pub exclude: ExcludeFilter,
    /// Shared across watch sessions so a target switch does not forget
    /// which contents were already seen.
    pub content: Option<Arc<Mutex<ContentFilter>>>,
}

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Roots that are actually being watched (missing ones are skipped).
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

/// Spawn a filesystem watcher over `request.roots` (relative to
/// `request.base`) and forward every add/change/unlink as a [`FileChange`]
/// with a path relative to the base.
///
/// No events are produced for files that already exist at startup. Roots
/// that do not exist are skipped with a warning.
pub fn spawn_watcher(
    request: &WatchRequest,
    filters: WatchFilters,
    changes_tx: mpsc::UnboundedSender<FileChange>,
) -> Result<WatcherHandle> {
    let base = request.base.clone();
    // Canonicalize once so we have a stable base path.
    let base = base.canonicalize().unwrap_or(base);

    let exclude_patterns = filters.exclude.patterns().to_vec();
    let callback_base = base.clone();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => forward_event(&callback_base, event, &filters, &changes_tx),
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    let mut roots = Vec::with_capacity(request.roots.len());
    for rel in &request.roots {
        let root = base.join(rel);
        if !root.is_dir() {
            warn!(root = ?root, "watch root does not exist; skipping");
            continue;
        }
        watcher.watch(&root, RecursiveMode::Recursive)?;
        roots.push(root);
    }

    info!(
        base = ?base,
        roots = roots.len(),
        excluded = ?exclude_patterns,
        "file watcher started"
    );

    Ok(WatcherHandle {
        _inner: watcher,
        roots,
    })
}

/// Runs on the notify thread: classify, relativize, filter and forward.
fn forward_event(
    base: &Path,
    event: Event,
    filters: &WatchFilters,
    changes_tx: &mpsc::UnboundedSender<FileChange>,
) {
    for (path, kind) in classify_event(&event) {
        let Some(rel) = relative_str(base, &path) else {
            debug!(path = ?path, base = ?base, "event outside of watch base; ignoring");
            continue;
        };

        if filters.exclude.is_excluded(&rel) {
            debug!(path = %rel, "excluded by pattern");
            continue;
        }

        if let Some(content) = &filters.content {
            let changed = match content.lock() {
                Ok(mut guard) => guard.is_changed(&path, kind),
                Err(_) => {
                    warn!("content filter mutex poisoned; forwarding anyway");
                    true
                }
            };
            if !changed {
                continue;
            }
        }

        if changes_tx.send(FileChange::new(rel, kind)).is_err() {
            // Receiver gone: the detector has shut down.
            return;
        }
    }
}

/// Map a notify event onto add/change/unlink per path.
///
/// Directory events, access events and metadata-only modifications are
/// dropped.
fn classify_event(event: &Event) -> Vec<(PathBuf, ChangeKind)> {
    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Add,
        EventKind::Remove(RemoveKind::Folder) => return Vec::new(),
        EventKind::Remove(_) => ChangeKind::Unlink,
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(ModifyKind::Name(mode)) => {
            return classify_rename(*mode, &event.paths);
        }
        EventKind::Modify(_) => ChangeKind::Change,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|p| kind == ChangeKind::Unlink || !p.is_dir())
        .map(|p| (p.clone(), kind))
        .collect()
}

fn classify_rename(mode: RenameMode, paths: &[PathBuf]) -> Vec<(PathBuf, ChangeKind)> {
    match (mode, paths) {
        (RenameMode::Both, [from, to]) => {
            let mut out = vec![(from.clone(), ChangeKind::Unlink)];
            if !to.is_dir() {
                out.push((to.clone(), ChangeKind::Add));
            }
            out
        }
        (RenameMode::From, _) => paths
            .iter()
            .map(|p| (p.clone(), ChangeKind::Unlink))
            .collect(),
        (RenameMode::To, _) => paths
            .iter()
            .filter(|p| !p.is_dir())
            .map(|p| (p.clone(), ChangeKind::Add))
            .collect(),
        _ => paths
            .iter()
            .filter(|p| !p.is_dir())
            .map(|p| {
                let kind = if p.exists() {
                    ChangeKind::Add
                } else {
                    ChangeKind::Unlink
                };
                (p.clone(), kind)
            })
            .collect(),
    }
}
