//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{clean::CleanArgs, locate::LocateArgs, status::StatusArgs};

#[derive(Parser)]
#[command(name = "zotsweep")]
#[command(author, version, about = "Reconcile Zotero attachment storage with the Zotero database")]
#[command(
    long_about = "Reconciles Zotero's on-disk attachment storage with zotero.sqlite: relocates duplicate and orphaned PDF files to a backup directory, then deletes empty and invalid storage folders."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Zotero data directory (default: auto-detect from the Zotero profile)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full cleanup pipeline (duplicates, orphans, folder pruning)
    Clean(CleanArgs),

    /// Report duplicates, orphans, and prunable folders without touching anything
    Status(StatusArgs),

    /// Print the resolved Zotero data, storage, and database locations
    Locate(LocateArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable styled text
    Text,
    /// JSON summary
    Json,
}
