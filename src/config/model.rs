// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::detector::{DetectorOptions, DEFAULT_WATCH_SUBDIR};
use crate::types::UnresolvedPathBehaviour;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// debounce_ms = 100
/// exclude = ["**/*.snap"]
///
/// [package.sdk-model]
/// dir = "libs/sdk-model"
///
/// [package.sdk-ui]
/// dir = "libs/sdk-ui"
/// depends_on = ["sdk-model"]
///
/// [target.demo-app]
/// depends_on = ["sdk-ui", "react"]
/// ```
///
/// All sections are optional at the TOML level; validation requires at least
/// one package.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Source packages from `[package.<name>]`, keyed by package name.
    #[serde(default)]
    pub package: BTreeMap<String, PackageConfig>,

    /// Link targets from `[target.<name>]`, keyed by target name.
    #[serde(default)]
    pub target: BTreeMap<String, TargetConfig>,
}

/// Validated configuration. Only constructed through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    package: BTreeMap<String, PackageConfig>,
    target: BTreeMap<String, TargetConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        package: BTreeMap<String, PackageConfig>,
        target: BTreeMap<String, TargetConfig>,
    ) -> Self {
        Self {
            config,
            package,
            target,
        }
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    pub fn packages(&self) -> &BTreeMap<String, PackageConfig> {
        &self.package
    }

    pub fn targets(&self) -> &BTreeMap<String, TargetConfig> {
        &self.target
    }

    /// Detector tunables derived from `[config]`.
    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            debounce: Duration::from_millis(self.config.debounce_ms),
            watch_subdir: self.config.watch_subdir.clone(),
            unresolved_paths: self.config.unresolved_paths,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Quiet period, in milliseconds, before buffered changes are processed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Sub-directory of each package that is watched (`""` for the whole
    /// package directory).
    #[serde(default = "default_watch_subdir")]
    pub watch_subdir: String,

    /// `"skip"` (default) or `"abort"`; see [`UnresolvedPathBehaviour`].
    #[serde(default)]
    pub unresolved_paths: UnresolvedPathBehaviour,

    /// Drop events for saves that leave a file byte-identical.
    #[serde(default)]
    pub skip_unchanged_content: bool,

    /// Glob patterns (relative to the source root) whose events are ignored.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_watch_subdir() -> String {
    DEFAULT_WATCH_SUBDIR.to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            watch_subdir: default_watch_subdir(),
            unresolved_paths: UnresolvedPathBehaviour::default(),
            skip_unchanged_content: false,
            exclude: Vec::new(),
        }
    }
}

/// `[package.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    /// Package directory relative to the source root, two segments deep
    /// (e.g. `libs/sdk-model`).
    pub dir: String,

    /// Other source packages this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl PackageConfig {
    /// `dir` with `/` separators and no leading `./` or trailing slash.
    pub fn normalized_dir(&self) -> String {
        let dir = self.dir.replace('\\', "/");
        let dir = dir.strip_prefix("./").unwrap_or(&dir);
        dir.trim_end_matches('/').to_string()
    }
}

/// `[target.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TargetConfig {
    /// Packages the target uses directly. Names that are not source packages
    /// are allowed; they are never watched.
    #[serde(default)]
    pub depends_on: Vec<String>,
}
