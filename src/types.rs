use std::str::FromStr;
use serde::Deserialize;

/// What to do with the rest of a drained batch when one of its paths cannot
/// be matched to a known package.
///
/// - `Skip`: warn about the path and keep resolving the remaining ones
///   (default behaviour).
/// - `Abort`: warn and stop resolving the batch at that path. Everything
///   resolved before it is still published; everything after it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPathBehaviour {
    Skip,
    Abort,
}

impl Default for UnresolvedPathBehaviour {
    fn default() -> Self {
        UnresolvedPathBehaviour::Skip
    }
}

impl FromStr for UnresolvedPathBehaviour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(UnresolvedPathBehaviour::Skip),
            "abort" => Ok(UnresolvedPathBehaviour::Abort),
            other => Err(format!(
                "invalid unresolved_paths: {other} (expected \"skip\" or \"abort\")"
            )),
        }
    }
}

/// Kind of raw filesystem event reported by the watcher.
///
/// Only used for logging; consumers of coalesced changes see paths only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Change,
    Unlink,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeKind::Add => "add",
            ChangeKind::Change => "change",
            ChangeKind::Unlink => "unlink",
        };
        f.write_str(s)
    }
}

/// A single raw file event, relative to the source root with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
