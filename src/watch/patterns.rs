// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled `exclude` glob patterns from `[config]`.
///
/// Patterns are matched against paths relative to the source root, e.g.
/// `"libs/sdk-ui/src/__snapshots__/a.snap"`.
#[derive(Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl fmt::Debug for ExcludeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeFilter")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExcludeFilter {
    /// Compile the given patterns. An empty list excludes nothing.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let set = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns).context("building exclude globset")?)
        };

        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if the relative path should be dropped.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.set
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path))
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
