// src/lib.rs

pub mod bus;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod detector;
pub mod errors;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bus::{BusEvent, EventBus};
use crate::cli::CliArgs;
use crate::config::{
    config_root_dir, load_and_validate, source_descriptor, target_descriptor, ConfigFile,
};
use crate::descriptor::PackageChange;
use crate::detector::{watch_request, ChangeDetector};
use crate::types::FileChange;
use crate::watch::{ContentFilter, ExcludeFilter, NotifyBackend, WatchFilters};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and package discovery
/// - the event bus and the change detector
/// - a stdout reporter for coalesced package changes
/// - target selection (`--target`, `--interactive`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root = config_root_dir(&config_path);

    let mut options = cfg.detector_options();
    if let Some(ms) = args.debounce_ms {
        if ms == 0 {
            bail!("--debounce-ms must be >= 1");
        }
        options.debounce = Duration::from_millis(ms);
    }

    if args.dry_run {
        print_dry_run(&cfg, &root, args.target.as_deref())?;
        return Ok(());
    }

    // Fail early on an unknown --target rather than after the watcher is up.
    let initial_target = match args.target.as_deref() {
        Some(name) => Some(Arc::new(target_descriptor(&cfg, name)?)),
        None => None,
    };

    let bus = EventBus::new();
    let reporter = spawn_reporter(bus.subscribe());

    let filters = WatchFilters {
        exclude: ExcludeFilter::new(&cfg.config().exclude)?,
        content: cfg
            .config()
            .skip_unchanged_content
            .then(|| Arc::new(Mutex::new(ContentFilter::new()))),
    };
    let (changes_tx, changes_rx) = mpsc::unbounded_channel::<FileChange>();
    let backend = NotifyBackend::new(changes_tx, filters);

    // Subscribes on construction, so it sees everything posted below.
    let detector = ChangeDetector::new(&bus, backend, changes_rx, options);
    let detector_task = tokio::spawn(detector.run());

    let source = Arc::new(source_descriptor(&cfg, &root));
    info!(packages = source.len(), root = ?root, "discovered source packages");
    bus.post(BusEvent::SourceInitialized(source));

    match initial_target {
        Some(target) => {
            bus.post(BusEvent::TargetSelected(target));
        }
        None if !args.interactive => {
            warn!("no --target given and not --interactive; nothing will be watched");
        }
        None => {}
    }

    if args.interactive {
        spawn_target_selector(Arc::new(cfg), bus.clone());
    }

    // Ctrl-C → graceful shutdown.
    {
        let bus = bus.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            bus.post(BusEvent::ShutdownRequested);
        });
    }

    detector_task.await??;
    let _ = reporter.await;

    info!("applink exiting");
    Ok(())
}

/// One line per changed package, e.g. `[applink] sdk-ui: src/a.ts, src/b.ts`.
pub fn format_change(change: &PackageChange) -> String {
    format!(
        "[applink] {}: {}",
        change.package_name,
        change.files.join(", ")
    )
}

/// Print every coalesced batch to stdout until shutdown.
fn spawn_reporter(mut rx: broadcast::Receiver<BusEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(BusEvent::PackagesChanged(changes)) => {
                    for change in &changes {
                        println!("{}", format_change(change));
                    }
                }
                Ok(BusEvent::ShutdownRequested) => break,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "reporter lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("reporter finished");
    })
}

/// Read target names from stdin and select each one.
fn spawn_target_selector(cfg: Arc<ConfigFile>, bus: EventBus) {
    tokio::spawn(async move {
        let names: Vec<&String> = cfg.targets().keys().collect();
        info!(targets = ?names, "type a target name and press Enter to select it");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read stdin; interactive selection stopped");
                    break;
                }
            };

            let name = line.trim();
            if name.is_empty() {
                continue;
            }

            match target_descriptor(&cfg, name) {
                Ok(target) => {
                    bus.post(BusEvent::TargetSelected(Arc::new(target)));
                }
                Err(err) => warn!("{err}"),
            }
        }
        debug!("stdin closed; interactive target selection finished");
    });
}

/// Dry-run output: packages, targets and what would be watched.
fn print_dry_run(cfg: &ConfigFile, root: &std::path::Path, target: Option<&str>) -> Result<()> {
    println!("applink dry-run");
    println!("  root = {}", root.display());
    println!("  config.debounce_ms = {}", cfg.config().debounce_ms);
    println!("  config.watch_subdir = {:?}", cfg.config().watch_subdir);
    println!(
        "  config.unresolved_paths = {:?}",
        cfg.config().unresolved_paths
    );
    if !cfg.config().exclude.is_empty() {
        println!("  config.exclude = {:?}", cfg.config().exclude);
    }
    println!();

    println!("packages ({}):", cfg.packages().len());
    for (name, pkg) in cfg.packages().iter() {
        println!("  - {name}");
        println!("      dir: {}", pkg.normalized_dir());
        if !pkg.depends_on.is_empty() {
            println!("      depends_on: {:?}", pkg.depends_on);
        }
    }

    let source = source_descriptor(cfg, root);
    let selected: Vec<&String> = match target {
        Some(name) => {
            if !cfg.targets().contains_key(name) {
                return Err(errors::ApplinkError::TargetNotFound(name.to_string()).into());
            }
            cfg.targets().keys().filter(|k| k.as_str() == name).collect()
        }
        None => cfg.targets().keys().collect(),
    };

    println!();
    println!("targets ({}):", selected.len());
    for name in selected {
        let descriptor = target_descriptor(cfg, name)?;
        let request = watch_request(&source, &descriptor, &cfg.config().watch_subdir);
        let deps: Vec<&str> = descriptor
            .dependencies
            .iter()
            .map(|d| d.package_name.as_str())
            .collect();

        println!("  - {name}");
        println!("      dependencies: {:?}", deps);
        println!("      watch: {:?}", request.roots);
    }

    debug!("dry-run complete (nothing watched)");
    Ok(())
}
