// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Foliant — batch merge of mixed documents onto fixed-size sheets.
//
// Entry point. Initialises logging, starts the document engine once, and hands
// each merge to the orchestrator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use foliant_core::{Imposition, MergeConfig, Orientation, PaperSize};
use foliant_document::{BuiltinEngine, EngineSession};
use foliant_merge::MergeOrchestrator;

#[derive(Parser, Debug)]
#[command(name = "foliant", version, about = "Merge a directory of documents into one PDF")]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge every file in a directory into a single PDF.
    Merge(MergeArgs),
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Directory whose files are merged (not searched recursively).
    input_dir: PathBuf,

    /// Path of the combined PDF.
    output: PathBuf,

    /// JSON configuration file; flags below override it.
    #[arg(long, env = "FOLIANT_CONFIG")]
    config: Option<PathBuf>,

    /// Sheet paper size: a3, a4, a5, letter, legal, tabloid.
    #[arg(long, value_parser = parse_paper)]
    paper: Option<PaperSize>,

    /// Landscape sheets.
    #[arg(long)]
    landscape: bool,

    /// Two source pages per sheet, side by side.
    #[arg(long)]
    two_up: bool,

    /// Skip the dense object layout when saving.
    #[arg(long)]
    no_linearize: bool,

    /// Parent directory for per-run scratch files.
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Write the run report as JSON to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Licence key passed to the document engine.
    #[arg(long, env = "FOLIANT_LICENSE_KEY", hide_env_values = true)]
    license_key: Option<String>,
}

fn parse_paper(name: &str) -> std::result::Result<PaperSize, String> {
    PaperSize::from_name(name).ok_or_else(|| format!("unknown paper size '{name}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Config => {
            println!("{}", MergeConfig::default().to_json_pretty()?);
            Ok(())
        }
        Command::Merge(args) => merge(args),
    }
}

/// Layer command-line flags over the file (or default) configuration.
fn build_config(args: &MergeArgs) -> Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MergeConfig::default(),
    };
    if let Some(paper) = args.paper {
        config.paper_size = paper;
    }
    if args.landscape {
        config.orientation = Orientation::Landscape;
    }
    if args.two_up {
        config.imposition = Imposition::TwoUp;
    }
    if args.no_linearize {
        config.save.linearized = false;
    }
    if let Some(dir) = &args.scratch_dir {
        config.scratch_root = Some(dir.clone());
    }
    if let Some(key) = &args.license_key {
        config.license_key = Some(key.clone());
    }
    config.validate()?;
    Ok(config)
}

fn merge(args: MergeArgs) -> Result<()> {
    let config = build_config(&args)?;

    let session = EngineSession::start(
        BuiltinEngine::from_config(&config),
        config.license_key.as_deref(),
    )
    .context("document engine could not be started")?;

    tracing::info!("Foliant starting");

    let mut orchestrator = MergeOrchestrator::new(&session, config);
    let report = orchestrator
        .run(&args.input_dir, &args.output)
        .with_context(|| format!("merge of {} failed", args.input_dir.display()))?;

    if let Some(path) = &args.report {
        report
            .save_to(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    for file in report.skipped_files() {
        if let Some(reason) = &file.skipped {
            eprintln!(
                "warning: skipped {} [{}]: {}",
                file.path.display(),
                reason.code,
                reason.message
            );
        }
    }
    println!(
        "{} file(s) merged into {} sheet(s): {}",
        report.merged_files().count(),
        report.sheets,
        report.output_path.display()
    );
    println!("sha256 {}", report.output_sha256);
    Ok(())
}
