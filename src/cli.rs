// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `applink`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "applink",
    version,
    about = "Watch SDK packages used by a target and report coalesced package changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Package dirs in the config are relative to the directory holding it.
    #[arg(long, value_name = "PATH", default_value = "Applink.toml")]
    pub config: String,

    /// Target to select at startup.
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Read target names from stdin, one per line, and switch to each.
    #[arg(long)]
    pub interactive: bool,

    /// Override `[config].debounce_ms`.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `APPLINK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print packages, targets and watch roots, but don't
    /// watch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
