//! `zotsweep locate` command - Print the resolved Zotero locations

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::commands::resolve_dirs;

#[derive(clap::Args, Debug)]
pub struct LocateArgs {}

pub fn run(_args: LocateArgs, global: &GlobalOpts) -> Result<()> {
    let dirs = resolve_dirs(global)?;

    match global.format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "data_dir": dirs.data_dir,
                "storage_dir": dirs.storage_dir,
                "db_path": dirs.db_path,
            });
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        OutputFormat::Text => {
            println!("{}", style("Zotero Locations").bold());
            println!("{}", style("─".repeat(40)).dim());
            println!("  Data directory:    {}", dirs.data_dir.display());
            println!("  Storage directory: {}", dirs.storage_dir.display());
            println!("  Database:          {}", dirs.db_path.display());
        }
    }

    Ok(())
}
