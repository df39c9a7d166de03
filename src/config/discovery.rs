// src/config/discovery.rs

//! Turning a validated config into the descriptors the detector consumes.

use std::collections::HashSet;
use std::path::Path;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::descriptor::{PackageDescriptor, SourceDescriptor, TargetDescriptor};
use crate::errors::{ApplinkError, Result};

/// All configured packages, rooted at `root`.
pub fn source_descriptor(cfg: &ConfigFile, root: &Path) -> SourceDescriptor {
    let packages = cfg
        .packages()
        .iter()
        .map(|(name, pkg)| PackageDescriptor::new(name.clone(), pkg.normalized_dir()));
    SourceDescriptor::new(root, packages)
}

/// Descriptor for the named target.
///
/// The dependency list holds every source package the target reaches through
/// `depends_on` (directly or via other packages), dependencies before
/// dependents, followed by the target's non-source dependencies in declared
/// order.
pub fn target_descriptor(cfg: &ConfigFile, name: &str) -> Result<TargetDescriptor> {
    let target = cfg
        .targets()
        .get(name)
        .ok_or_else(|| ApplinkError::TargetNotFound(name.to_string()))?;

    let reachable = reachable_packages(cfg, &target.depends_on);
    let ordered = topological_packages(cfg)?;

    let mut deps: Vec<String> = ordered
        .into_iter()
        .filter(|p| reachable.contains(p.as_str()))
        .collect();

    for dep in target.depends_on.iter() {
        if !cfg.packages().contains_key(dep) && !deps.contains(dep) {
            debug!(target = %name, dependency = %dep, "dependency is not a source package");
            deps.push(dep.clone());
        }
    }

    Ok(TargetDescriptor::new(name, deps))
}

/// Source packages reachable from `roots` via `depends_on`, roots included.
fn reachable_packages<'a>(cfg: &'a ConfigFile, roots: &'a [String]) -> HashSet<&'a str> {
    let mut stack: Vec<&str> = roots.iter().map(String::as_str).collect();
    let mut visited: HashSet<&str> = HashSet::new();

    while let Some(current) = stack.pop() {
        let Some(pkg) = cfg.packages().get(current) else {
            continue;
        };
        if !visited.insert(current) {
            continue;
        }
        stack.extend(pkg.depends_on.iter().map(String::as_str));
    }

    visited
}

/// All packages, dependencies first.
fn topological_packages(cfg: &ConfigFile) -> Result<Vec<String>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for name in cfg.packages().keys() {
        graph.add_node(name.as_str());
    }
    for (name, pkg) in cfg.packages().iter() {
        for dep in pkg.depends_on.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(str::to_string).collect())
        .map_err(|cycle| {
            ApplinkError::DependencyCycle(format!(
                "cycle detected in package dependencies involving package '{}'",
                cycle.node_id()
            ))
        })
}
