// src/config/validate.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ApplinkError, Result};
use crate::watch::ExcludeFilter;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ApplinkError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.package, raw.target))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_packages(cfg)?;
    validate_global_config(cfg)?;
    validate_package_dirs(cfg)?;
    validate_package_dependencies(cfg)?;
    validate_dag(cfg)?;
    warn_on_empty_targets(cfg);
    Ok(())
}

fn ensure_has_packages(cfg: &RawConfigFile) -> Result<()> {
    if cfg.package.is_empty() {
        return Err(ApplinkError::ConfigError(
            "config must contain at least one [package.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.debounce_ms == 0 {
        return Err(ApplinkError::ConfigError(
            "[config].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    ExcludeFilter::new(&cfg.config.exclude)
        .map_err(|e| ApplinkError::ConfigError(format!("[config].exclude: {e:#}")))?;

    Ok(())
}

/// Package directories are resolved from the top two segments of a changed
/// path, so every `dir` must be exactly two segments deep and unique.
fn validate_package_dirs(cfg: &RawConfigFile) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (name, pkg) in cfg.package.iter() {
        let dir = pkg.normalized_dir();
        let segments: Vec<&str> = dir.split('/').collect();
        let well_formed = segments.len() == 2
            && segments
                .iter()
                .all(|s| !s.is_empty() && *s != "." && *s != "..");

        if !well_formed {
            return Err(ApplinkError::ConfigError(format!(
                "package '{}' has dir '{}'; expected exactly two path segments like 'libs/{}'",
                name, pkg.dir, name
            )));
        }

        if let Some(other) = seen.insert(dir.clone(), name.as_str()) {
            return Err(ApplinkError::ConfigError(format!(
                "packages '{}' and '{}' share the same dir '{}'",
                other, name, dir
            )));
        }
    }
    Ok(())
}

fn validate_package_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, pkg) in cfg.package.iter() {
        for dep in pkg.depends_on.iter() {
            if !cfg.package.contains_key(dep) {
                return Err(ApplinkError::ConfigError(format!(
                    "package '{}' has unknown dependency '{}' in `depends_on`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(ApplinkError::ConfigError(format!(
                    "package '{}' cannot depend on itself in `depends_on`",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> package.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.package.keys() {
        graph.add_node(name.as_str());
    }

    for (name, pkg) in cfg.package.iter() {
        for dep in pkg.depends_on.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(ApplinkError::DependencyCycle(format!(
                "cycle detected in package dependencies involving package '{}'",
                node
            )))
        }
    }
}

fn warn_on_empty_targets(cfg: &RawConfigFile) {
    for (name, target) in cfg.target.iter() {
        if !target.depends_on.iter().any(|d| cfg.package.contains_key(d)) {
            warn!(target = %name, "target does not depend on any source package; nothing will be watched");
        }
    }
}
