// tests/discovery.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use std::path::Path;

use applink::config::{source_descriptor, target_descriptor, ConfigFile};
use applink::detector::{watch_request, DEFAULT_WATCH_SUBDIR};
use applink::errors::ApplinkError;

/// sdk-model <- sdk-backend <- sdk-ui <- sdk-ui-charts, plus an unrelated
/// sdk-ui-geo.
fn sdk() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_package("sdk-model", "libs/sdk-model", &[])
        .with_package("sdk-backend", "libs/sdk-backend", &["sdk-model"])
        .with_package("sdk-ui", "libs/sdk-ui", &["sdk-backend", "sdk-model"])
        .with_package("sdk-ui-charts", "libs/sdk-ui-charts", &["sdk-ui"])
        .with_package("sdk-ui-geo", "libs/sdk-ui-geo", &["sdk-ui"])
        .with_target("dashboard", &["sdk-ui-charts", "react"])
        .with_target("model-only", &["sdk-model"])
        .build()
}

fn names(target: &applink::descriptor::TargetDescriptor) -> Vec<&str> {
    target
        .dependencies
        .iter()
        .map(|d| d.package_name.as_str())
        .collect()
}

#[test]
fn source_descriptor_indexes_by_name_and_dir() {
    let source = source_descriptor(&sdk(), Path::new("/repo"));

    assert_eq!(source.len(), 5);
    assert_eq!(source.root(), Path::new("/repo"));
    assert_eq!(
        source.package_by_dir("libs/sdk-ui").map(|p| p.package_name.as_str()),
        Some("sdk-ui")
    );
    assert_eq!(
        source.package("sdk-model").map(|p| p.directory.as_str()),
        Some("libs/sdk-model")
    );
}

#[test]
fn target_dependencies_are_closed_and_ordered_dependencies_first() {
    let target = target_descriptor(&sdk(), "dashboard").unwrap();
    let deps = names(&target);

    assert_eq!(
        deps,
        vec!["sdk-model", "sdk-backend", "sdk-ui", "sdk-ui-charts", "react"]
    );
    assert!(!deps.contains(&"sdk-ui-geo"));
}

#[test]
fn target_with_leaf_dependency_only_watches_that_package() {
    let cfg = sdk();
    let source = source_descriptor(&cfg, Path::new("/repo"));
    let target = target_descriptor(&cfg, "model-only").unwrap();

    let request = watch_request(&source, &target, DEFAULT_WATCH_SUBDIR);
    assert_eq!(request.roots, vec!["libs/sdk-model/src".to_string()]);
}

#[test]
fn non_source_dependencies_are_never_watched() {
    let cfg = sdk();
    let source = source_descriptor(&cfg, Path::new("/repo"));
    let target = target_descriptor(&cfg, "dashboard").unwrap();

    let request = watch_request(&source, &target, DEFAULT_WATCH_SUBDIR);
    assert_eq!(request.roots.len(), 4);
    assert!(request.roots.iter().all(|r| r.starts_with("libs/")));
}

#[test]
fn unknown_target_is_reported() {
    match target_descriptor(&sdk(), "nope") {
        Err(ApplinkError::TargetNotFound(name)) => assert_eq!(name, "nope"),
        other => panic!("Expected TargetNotFound, got: {:?}", other),
    }
}
