//! `zotsweep status` command - Read-only reconciliation report
//!
//! Classifies storage against the database exactly like `clean` would,
//! but never mutates: no relocations, no folder removal. Folder counts
//! reflect a first pruning pass only, since later passes depend on
//! deletions actually happening.

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::commands::resolve_dirs;
use crate::core::db::AttachmentIndex;
use crate::core::dedupe::find_duplicates;
use crate::core::orphan::find_orphans;
use crate::core::prune::{prune_candidates, Removal};
use crate::core::report::StatusSummary;
use crate::core::scan::scan_pdfs;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let dirs = resolve_dirs(global)?;

    let files = scan_pdfs(&dirs.storage_dir);
    let index = AttachmentIndex::load(&dirs.db_path)?;

    let groups = find_duplicates(&files, &index);
    let orphans = find_orphans(&files, &index);
    let candidates = prune_candidates(&dirs.storage_dir, &index);
    let empty_candidates = candidates
        .iter()
        .filter(|(_, r)| *r == Removal::Empty)
        .count();

    let summary = StatusSummary {
        pdf_files_scanned: files.len(),
        db_filenames: index.filename_count(),
        db_folders: index.valid_folders().len(),
        duplicate_groups: groups.len(),
        duplicate_copies_to_move: groups.iter().map(|g| g.remove.len()).sum(),
        orphans: orphans.len(),
        empty_folder_candidates: empty_candidates,
        invalid_folder_candidates: candidates.len() - empty_candidates,
    };

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).into_diagnostic()?
            );
        }
        OutputFormat::Text => {
            println!("{}", style("Storage Status").bold());
            println!("{}", style("─".repeat(40)).dim());
            println!("  Storage:           {}", dirs.storage_dir.display());
            println!(
                "  PDF files:         {}",
                style(summary.pdf_files_scanned).cyan()
            );
            println!(
                "  Database records:  {} filenames, {} folders",
                style(summary.db_filenames).cyan(),
                style(summary.db_folders).cyan()
            );
            println!();
            println!(
                "  Duplicate groups:  {} ({} copies to move)",
                style(summary.duplicate_groups).cyan(),
                summary.duplicate_copies_to_move
            );
            println!("  Orphaned files:    {}", style(summary.orphans).cyan());
            println!(
                "  Prunable folders:  {} ({} empty, {} without PDFs)",
                style(summary.empty_folder_candidates + summary.invalid_folder_candidates).cyan(),
                summary.empty_folder_candidates,
                summary.invalid_folder_candidates
            );

            if global.verbose {
                for group in &groups {
                    for copy in &group.remove {
                        println!(
                            "    {} duplicate  {}/{}",
                            style("✗").red(),
                            copy.folder,
                            copy.filename
                        );
                    }
                }
                for orphan in &orphans {
                    println!(
                        "    {} orphan     {}/{}",
                        style("✗").red(),
                        orphan.folder,
                        orphan.filename
                    );
                }
            }
        }
    }

    Ok(())
}
