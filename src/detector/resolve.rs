// src/detector/resolve.rs

//! Mapping changed file paths to the packages that own them, and coalescing
//! the results of one drain cycle into per-package records.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::descriptor::{PackageChange, SourceDescriptor};
use crate::types::UnresolvedPathBehaviour;

/// Resolve a single path (relative to the source root, `/`-separated) to the
/// package that owns it.
///
/// The top two path segments name the package directory:
/// `libs/sdk-model/src/index.ts` → directory `libs/sdk-model`, file
/// `src/index.ts`.
///
/// Returns `None` (after logging a warning) if the path has fewer than three
/// segments or the directory is not a known package.
pub fn identify_changed_package(
    source: &SourceDescriptor,
    file: &str,
) -> Option<PackageChange> {
    let first = file.find('/');
    let lib_end = first.and_then(|i| file[i + 1..].find('/').map(|j| i + 1 + j));

    let Some(lib_end) = lib_end else {
        warn!("Unable to find SDK lib to which {file} belongs.");
        return None;
    };

    let lib_dir = &file[..lib_end];
    let Some(pkg) = source.package_by_dir(lib_dir) else {
        warn!(
            "Unable to find SDK lib to which {file} belongs. Cannot match {lib_dir} to an SDK package."
        );
        return None;
    };

    Some(PackageChange {
        package_name: pkg.package_name.clone(),
        files: vec![file[lib_end + 1..].to_string()],
    })
}

/// Resolve and group a drained batch of paths.
///
/// Packages appear in the order their first file was seen; file lists keep
/// arrival order and are not deduplicated (the same file saved twice shows
/// up twice).
pub fn coalesce_changes(
    source: &SourceDescriptor,
    files: &[String],
    behaviour: UnresolvedPathBehaviour,
) -> Vec<PackageChange> {
    let mut changes: Vec<PackageChange> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in files {
        let Some(change) = identify_changed_package(source, file) else {
            match behaviour {
                UnresolvedPathBehaviour::Skip => continue,
                UnresolvedPathBehaviour::Abort => {
                    debug!(
                        path = %file,
                        "unresolvable path; dropping the rest of this batch"
                    );
                    break;
                }
            }
        };

        match index.get(&change.package_name) {
            Some(&i) => changes[i].files.extend(change.files),
            None => {
                index.insert(change.package_name.clone(), changes.len());
                changes.push(change);
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PackageDescriptor;

    fn source() -> SourceDescriptor {
        SourceDescriptor::new(
            "/repo",
            [
                PackageDescriptor::new("Foo", "libs/foo"),
                PackageDescriptor::new("Bar", "libs/bar"),
            ],
        )
    }

    fn paths(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identifies_package_from_top_two_segments() {
        let change = identify_changed_package(&source(), "libs/foo/src/deep/a.ts").unwrap();
        assert_eq!(change.package_name, "Foo");
        assert_eq!(change.files, vec!["src/deep/a.ts".to_string()]);
    }

    #[test]
    fn paths_with_too_few_segments_do_not_resolve() {
        assert!(identify_changed_package(&source(), "README.md").is_none());
        assert!(identify_changed_package(&source(), "libs/foo").is_none());
    }

    #[test]
    fn unknown_directories_do_not_resolve() {
        assert!(identify_changed_package(&source(), "libs/baz/src/a.ts").is_none());
    }

    #[test]
    fn groups_by_package_in_first_seen_order() {
        let out = coalesce_changes(
            &source(),
            &paths(&["libs/foo/src/a.ts", "libs/bar/src/b.ts", "libs/foo/src/c.ts"]),
            UnresolvedPathBehaviour::Skip,
        );

        assert_eq!(
            out,
            vec![
                PackageChange {
                    package_name: "Foo".into(),
                    files: paths(&["src/a.ts", "src/c.ts"]),
                },
                PackageChange {
                    package_name: "Bar".into(),
                    files: paths(&["src/b.ts"]),
                },
            ]
        );
    }

    #[test]
    fn skip_mode_omits_only_the_unresolved_path() {
        let out = coalesce_changes(
            &source(),
            &paths(&["unknown/x.ts", "libs/foo/src/a.ts"]),
            UnresolvedPathBehaviour::Skip,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].package_name, "Foo");
        assert_eq!(out[0].files, paths(&["src/a.ts"]));
    }

    #[test]
    fn abort_mode_drops_everything_after_the_unresolved_path() {
        let out = coalesce_changes(
            &source(),
            &paths(&["unknown/x.ts", "libs/foo/src/a.ts"]),
            UnresolvedPathBehaviour::Abort,
        );
        assert!(out.is_empty());

        let out = coalesce_changes(
            &source(),
            &paths(&["libs/bar/src/b.ts", "unknown/x.ts", "libs/foo/src/a.ts"]),
            UnresolvedPathBehaviour::Abort,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].package_name, "Bar");
    }
}
