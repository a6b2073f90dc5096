// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Keylime Authors

//! # rpm-trust-scanner
//!
//! Split the installed package inventory of a system about to be upgraded
//! into packages signed by a known vendor and unsigned packages.

#![deny(
    nonstandard_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]

mod output;
mod scan;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error};
use rpm_trust::config::{ScannerConfig, ScannerOverrides};
use std::path::PathBuf;
use std::process;

use crate::output::{Format, OutputHandler};

/// Classify installed packages as vendor signed or unsigned
#[derive(Debug, Parser)]
#[command(
    name = "rpm-trust-scanner",
    version,
    about = "Classify installed RPM packages as vendor signed or unsigned",
    after_long_help = "CONFIGURATION SOURCES (highest to lowest priority):\n  \
        1. Command-line arguments (--upgrade-path, --cloud-map, etc.)\n  \
        2. LEAPP_DEVEL_RPMS_ALL_SIGNED=1 (trust every gpg-pubkey record)\n  \
        3. Environment variables (RPM_TRUST_SCANNER__UPGRADE_PATH, etc.)\n  \
        4. Configuration files (/etc/rpm-trust/scanner.conf, \
        /etc/rpm-trust/scanner.conf.d/*, or RPM_TRUST_CONFIG)\n  \
        5. Built-in defaults"
)]
struct Cli {
    /// Installed package inventory (JSON), `-` to read from stdin
    #[arg(value_name = "INVENTORY")]
    inventory: PathBuf,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Upgrade path identifier, e.g. 8to9
    #[arg(long, value_name = "ID")]
    upgrade_path: Option<String>,

    /// Version of the system being upgraded, e.g. 8.10
    #[arg(long, value_name = "VERSION")]
    source_version: Option<String>,

    /// Version to upgrade to, e.g. 9.4
    #[arg(long, value_name = "VERSION")]
    target_version: Option<String>,

    /// Cloud package map (JSON)
    #[arg(long, value_name = "FILE")]
    cloud_map: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all logging
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ScannerOverrides {
        ScannerOverrides {
            upgrade_path: self.upgrade_path.clone(),
            source_version: self.source_version.clone(),
            target_version: self.target_version.clone(),
            cloud_map: self.cloud_map.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        error!("Scan failed: {e:#}");
        if cli.quiet {
            eprintln!("Error: {e:#}");
        }
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = ScannerConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(&cli.overrides());
    debug!("Final configuration after CLI overrides: {config:?}");

    let inventory = scan::read_inventory(&cli.inventory)?;
    let result = scan::run(&config, inventory)?;

    OutputHandler::new(cli.format, cli.pretty)
        .success(&result)
        .context("Failed to serialize result")
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    pretty_env_logger::formatted_builder()
        .filter_level(log_level)
        .target(pretty_env_logger::env_logger::Target::Stderr)
        .init();
}
