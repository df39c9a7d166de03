// src/detector/scope.rs

//! Watch-scope computation: which directories to watch for a given target.

use std::path::PathBuf;

use crate::descriptor::{PackageDescriptor, SourceDescriptor, TargetDescriptor};

/// Default sub-directory of each package that is watched.
pub const DEFAULT_WATCH_SUBDIR: &str = "src";

/// What the watch backend should observe.
///
/// `roots` are relative to `base`; the backend reports event paths relative
/// to `base` as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRequest {
    pub base: PathBuf,
    pub roots: Vec<String>,
}

/// Source packages the target depends on, in source (name) order.
///
/// The target's dependency list is taken as-is; no closure is computed here.
/// Dependencies that are not source packages are ignored.
pub fn watch_scope<'a>(
    source: &'a SourceDescriptor,
    target: &TargetDescriptor,
) -> Vec<&'a PackageDescriptor> {
    source
        .packages()
        .filter(|pkg| target.depends_on(&pkg.package_name))
        .collect()
}

/// Build the watch request for a target: one root per scoped package,
/// `<package-dir>/<subdir>`.
pub fn watch_request(
    source: &SourceDescriptor,
    target: &TargetDescriptor,
    subdir: &str,
) -> WatchRequest {
    let subdir = subdir.trim_matches('/');
    let roots = watch_scope(source, target)
        .into_iter()
        .map(|pkg| {
            if subdir.is_empty() {
                pkg.directory.clone()
            } else {
                format!("{}/{}", pkg.directory, subdir)
            }
        })
        .collect();

    WatchRequest {
        base: source.root().clone(),
        roots,
    }
}
