// src/config/mod.rs

//! Configuration loading and validation for applink.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate package dirs and the package dependency graph (`validate.rs`).
//! - Build source/target descriptors from a validated config (`discovery.rs`).

pub mod discovery;
pub mod loader;
pub mod model;
pub mod validate;

pub use discovery::{source_descriptor, target_descriptor};
pub use loader::{config_root_dir, load_and_validate, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{ConfigFile, ConfigSection, PackageConfig, RawConfigFile, TargetConfig};
