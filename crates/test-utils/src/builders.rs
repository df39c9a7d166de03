#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use applink::config::{ConfigFile, ConfigSection, PackageConfig, RawConfigFile, TargetConfig};
use applink::descriptor::{PackageDescriptor, SourceDescriptor, TargetDescriptor};
use applink::types::UnresolvedPathBehaviour;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                package: BTreeMap::new(),
                target: BTreeMap::new(),
            },
        }
    }

    pub fn with_package(mut self, name: &str, dir: &str, depends_on: &[&str]) -> Self {
        self.config.package.insert(
            name.to_string(),
            PackageConfig {
                dir: dir.to_string(),
                depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_target(mut self, name: &str, depends_on: &[&str]) -> Self {
        self.config.target.insert(
            name.to_string(),
            TargetConfig {
                depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.config.debounce_ms = ms;
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.config.config.exclude.push(pattern.to_string());
        self
    }

    pub fn with_unresolved_paths(mut self, behaviour: UnresolvedPathBehaviour) -> Self {
        self.config.config.unresolved_paths = behaviour;
        self
    }

    /// The raw config, for tests that exercise validation failures.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `{"libs/foo": Foo, "libs/bar": Bar}` rooted at `root`.
pub fn foo_bar_source(root: &str) -> Arc<SourceDescriptor> {
    Arc::new(SourceDescriptor::new(
        root,
        [
            PackageDescriptor::new("Foo", "libs/foo"),
            PackageDescriptor::new("Bar", "libs/bar"),
        ],
    ))
}

pub fn target(name: &str, deps: &[&str]) -> Arc<TargetDescriptor> {
    Arc::new(TargetDescriptor::new(name, deps.iter().copied()))
}
