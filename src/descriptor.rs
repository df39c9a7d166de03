// src/descriptor.rs

//! Descriptors handed to the change detector by the discovery phase, and the
//! per-package change records it publishes.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Canonical package name type.
pub type PackageName = String;

/// A source package: its name and its directory relative to the source root
/// (always `/`-separated, e.g. `libs/sdk-model`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub package_name: PackageName,
    pub directory: String,
}

impl PackageDescriptor {
    pub fn new(package_name: impl Into<PackageName>, directory: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            directory: directory.into(),
        }
    }
}

/// All known source packages, indexed both by name and by directory.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    root: PathBuf,
    packages: BTreeMap<PackageName, PackageDescriptor>,
    packages_by_dir: HashMap<String, PackageDescriptor>,
}

impl SourceDescriptor {
    /// Build a descriptor from a list of packages.
    ///
    /// If two packages share a name or a directory, the later one wins; the
    /// config validation rejects such inputs before they get here.
    pub fn new<I>(root: impl Into<PathBuf>, packages: I) -> Self
    where
        I: IntoIterator<Item = PackageDescriptor>,
    {
        let mut by_name = BTreeMap::new();
        let mut by_dir = HashMap::new();

        for pkg in packages {
            by_dir.insert(pkg.directory.clone(), pkg.clone());
            by_name.insert(pkg.package_name.clone(), pkg);
        }

        Self {
            root: root.into(),
            packages: by_name,
            packages_by_dir: by_dir,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Packages in name order.
    pub fn packages(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.packages.values()
    }

    pub fn package(&self, name: &str) -> Option<&PackageDescriptor> {
        self.packages.get(name)
    }

    pub fn package_by_dir(&self, dir: &str) -> Option<&PackageDescriptor> {
        self.packages_by_dir.get(dir)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Reference from a target to one package it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub package_name: PackageName,
}

/// The currently selected target and the ordered list of packages it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub name: String,
    pub dependencies: Vec<DependencyRef>,
}

impl TargetDescriptor {
    pub fn new<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PackageName>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies
                .into_iter()
                .map(|d| DependencyRef {
                    package_name: d.into(),
                })
                .collect(),
        }
    }

    pub fn depends_on(&self, package_name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.package_name == package_name)
    }
}

/// Files changed within one package during one coalescing cycle.
///
/// `files` are relative to the package directory (e.g. `src/index.ts`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageChange {
    pub package_name: PackageName,
    pub files: Vec<String>,
}
