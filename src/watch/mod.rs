// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`) over a set of
//!   package source roots.
//! - Turning raw notify events into add/change/unlink [`FileChange`]s with
//!   paths relative to the source root.
//! - Dropping excluded paths (`exclude` globs) and, optionally, saves that
//!   leave file contents unchanged.
//!
//! It does **not** know about packages or targets; that is the detector's
//! job.
//!
//! [`FileChange`]: crate::types::FileChange

pub mod backend;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use backend::{NotifyBackend, WatchBackend};
pub use hash::{compute_file_hash, ContentFilter};
pub use patterns::ExcludeFilter;
pub use watcher::{spawn_watcher, WatchFilters, WatcherHandle};
